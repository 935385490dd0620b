use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::domain::TVConfig;
use crate::model::{FilterKind, Model, UIData};

pub const SIDEBAR_WIDTH: u16 = 34;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const COLUMN_WIDTH_MARGIN: u16 = 2;

#[derive(Debug)]
pub struct TableUI {
    max_column_width: u16,
    filter_state: ListState,
    picker_state: ListState,
}

impl TableUI {
    pub fn new(config: &TVConfig) -> Self {
        Self {
            max_column_width: u16::try_from(config.max_column_width).unwrap_or(u16::MAX),
            filter_state: ListState::default(),
            picker_state: ListState::default(),
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();

        let [main, statusline] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(STATUSLINE_HEIGHT)])
                .areas(frame.area());
        let [sidebar, record] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
                .areas(main);

        self.draw_filters(uidata, frame, sidebar);
        self.draw_record(uidata, frame, record);
        self.draw_statusline(uidata, frame, statusline);

        if uidata.picker.is_some() {
            self.draw_picker(uidata, frame);
        }
        if uidata.show_popup {
            Self::draw_popup(uidata, frame);
        }
    }

    fn draw_filters(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let instructions = Line::from(vec![
            " Edit ".into(),
            "<Enter>".blue().bold(),
            " Apply ".into(),
            "<A>".blue().bold(),
            " Clear ".into(),
            "<C> ".blue().bold(),
        ]);
        let block = Block::bordered()
            .title(Line::from(" Filters ".bold()).centered())
            .title_bottom(instructions.centered());

        if uidata.filters.is_empty() {
            let text = if uidata.name.is_empty() {
                "No data loaded"
            } else {
                "No filterable columns"
            };
            frame.render_widget(
                Paragraph::new(text.dark_gray()).centered().block(block),
                area,
            );
            return;
        }

        let items: Vec<ListItem> = uidata
            .filters
            .iter()
            .map(|f| {
                let value = if f.value.is_empty() {
                    Span::from("(any)").dark_gray()
                } else {
                    Span::from(f.value.clone()).yellow()
                };
                let marker = match f.kind {
                    Some(FilterKind::Search) => "contains ",
                    _ => "= ",
                };
                ListItem::new(vec![
                    Line::from(f.label.clone().bold()),
                    Line::from(vec![Span::from("  "), Span::from(marker), value]),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        self.filter_state.select(Some(uidata.selected_filter));
        frame.render_stateful_widget(list, area, &mut self.filter_state);
    }

    fn draw_record(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let title = match uidata.position {
            Some((position, total)) => format!(" Record {position} of {total} "),
            None => " Record ".to_string(),
        };
        let instructions = Line::from(vec![
            " Previous ".into(),
            "<Left>".blue().bold(),
            " Next ".into(),
            "<Right>".blue().bold(),
            " Help ".into(),
            "<?>".blue().bold(),
            " Quit ".into(),
            "<Q> ".blue().bold(),
        ]);
        let mut block = Block::bordered()
            .title(Line::from(title.bold()).centered())
            .title_bottom(instructions.centered())
            .border_set(border::THICK);
        if !uidata.name.is_empty() {
            block = block.title(Line::from(format!(" {} ", uidata.name).yellow()).right_aligned());
        }

        if uidata.position.is_none() {
            let text = Text::from(vec![Line::from(""), Line::from(uidata.placeholder.clone())]);
            frame.render_widget(Paragraph::new(text).centered().block(block), area);
            return;
        }

        let header_width = std::cmp::min(uidata.header_width as u16, self.max_column_width)
            + COLUMN_WIDTH_MARGIN;
        let rows: Vec<Row> = uidata
            .record
            .iter()
            .map(|(name, value)| {
                Row::new(vec![
                    Cell::from(format!("{name}:"))
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                    Cell::from(value.clone()),
                ])
            })
            .collect();
        let table = Table::new(rows, [Constraint::Length(header_width), Constraint::Min(0)])
            .block(block)
            .column_spacing(1);
        frame.render_widget(table, area);
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        if uidata.active_cmdinput {
            let prompt = uidata.cmd_mode.map(|m| m.prompt()).unwrap_or("> ");
            let line = Line::from(vec![
                Span::from(prompt).blue().bold(),
                Span::from(uidata.cmdinput.input.clone()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            let x = area.x + prompt.chars().count() as u16 + uidata.cmdinput.curser_pos as u16;
            frame.set_cursor_position((std::cmp::min(x, area.right().saturating_sub(1)), area.y));
            return;
        }

        let showing = match uidata.position {
            Some((position, total)) => format!(" Showing {position} of {total} result(s) "),
            None => format!(" {} ", uidata.placeholder),
        };
        let [left, right] =
            Layout::horizontal([Constraint::Length(showing.chars().count() as u16), Constraint::Min(0)])
                .areas(area);
        frame.render_widget(
            Paragraph::new(Span::from(showing).style(Style::default().bg(Color::Blue).fg(Color::White))),
            left,
        );
        frame.render_widget(
            Paragraph::new(Line::from(format!(" {}", uidata.status_message)).right_aligned()),
            right,
        );
    }

    fn draw_picker(&mut self, uidata: &UIData, frame: &mut Frame) {
        let Some(picker) = uidata.picker.as_ref() else {
            return;
        };
        let area = popup_area(frame.area(), 40, 60);
        let items: Vec<ListItem> = picker
            .values
            .iter()
            .map(|v| ListItem::new(v.clone()))
            .collect();
        let list = List::new(items)
            .block(
                Block::bordered()
                    .title(Line::from(format!(" Select {} ", picker.title).bold()).centered())
                    .title_bottom(Line::from(" <Enter> pick  <Esc> cancel ").centered()),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        self.picker_state.select(Some(picker.selected));
        frame.render_widget(Clear, area);
        frame.render_stateful_widget(list, area, &mut self.picker_state);
    }

    fn draw_popup(uidata: &UIData, frame: &mut Frame) {
        let area = popup_area(frame.area(), 60, 70);
        let popup = Paragraph::new(uidata.popup_message.clone())
            .wrap(Wrap { trim: false })
            .block(
                Block::bordered()
                    .title(Line::from(" Help ".bold()).centered())
                    .title_bottom(Line::from(" <Esc> close ").centered())
                    .border_set(border::THICK),
            );
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
