use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::time::Instant;
use tracing::{error, info, trace};

use crate::domain::{CMDMode, HELP_TEXT, Message, TVConfig, TVError};
use crate::export;
use crate::filter::Criterion;
use crate::inputter::{InputResult, Inputter};
use crate::loader;
use crate::view::DatasetView;

pub const NO_RECORDS: &str = "No records found.";
pub const NO_DATA: &str = "Please open a CSV or JSON file to get started (press o).";
const ANY_VALUE: &str = "(any)";
const PAGE_SIZE: usize = 10;
// Borders of the record block and the status line.
const RECORD_CHROME_ROWS: usize = 3;

#[derive(Debug, PartialEq)]
pub enum Status {
    EMPTY,
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    BROWSE,
    PICKER,
    POPUP,
    CMDINPUT,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    Search,
    Pick,
}

/// A filter offered in the sidebar.
#[derive(Debug, Clone)]
struct FilterEntry {
    column: String,
    kind: FilterKind,
}

/// Pick list of `[""] + distinct values` for one column.
struct PickerView {
    column: String,
    values: Vec<String>,
    curser_row: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FilterLine {
    pub label: String,
    pub value: String,
    pub kind: Option<FilterKind>,
}

#[derive(Debug, Clone, Default)]
pub struct PickerData {
    pub title: String,
    pub values: Vec<String>,
    pub selected: usize,
}

pub struct UIData {
    pub name: String,
    pub filters: Vec<FilterLine>,
    pub selected_filter: usize,
    pub record: Vec<(String, String)>, // (field, value) after the scroll offset
    pub position: Option<(usize, usize)>, // (1-based position, total)
    pub placeholder: String,
    pub header_width: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub picker: Option<PickerData>,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            filters: Vec::new(),
            selected_filter: 0,
            record: Vec::new(),
            position: None,
            placeholder: NO_DATA.to_string(),
            header_width: 0,
            show_popup: false,
            popup_message: String::new(),
            picker: None,
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
        }
    }
}

pub struct Model {
    config: TVConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    view: DatasetView,
    filters: Vec<FilterEntry>,
    selected_filter: usize,
    picker: Option<PickerView>,
    record_offset: usize,
    page_size: usize,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    active_cmdinput: bool,
    status_message: String,
}

impl Model {
    pub fn init(config: &TVConfig) -> Self {
        let mut model = Self {
            config: config.clone(),
            status: Status::EMPTY,
            modus: Modus::BROWSE,
            previous_modus: Modus::BROWSE,
            view: DatasetView::new(),
            filters: Vec::new(),
            selected_filter: 0,
            picker: None,
            record_offset: 0,
            page_size: PAGE_SIZE,
            uidata: UIData::empty(),
            clipboard: None,
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            status_message: "Started rv!".to_string(),
        };
        model.update_uidata();
        model
    }

    /// Loads `path` into the view. On failure the current data stays untouched.
    pub fn load_data_file(&mut self, path: &str) -> Result<(), TVError> {
        let start_time = Instant::now();
        let table = loader::load_file(path)?;
        let name = table.name().to_string();
        let nrows = table.nrows();

        self.view.load(table);
        self.build_filters();
        self.record_offset = 0;
        self.status = Status::READY;
        self.set_status_message(format!(
            "Loaded {} records from {} in {}ms ...",
            nrows,
            name,
            start_time.elapsed().as_millis()
        ));
        Ok(())
    }

    pub fn view(&self) -> &DatasetView {
        &self.view
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), TVError> {
        if let Some(msg) = message {
            if let Message::Resize(_, height) = msg {
                self.resize(height);
                self.update_uidata();
                return Ok(());
            }
            match self.modus {
                Modus::BROWSE => match msg {
                    Message::Quit => self.quit(),
                    Message::NextRecord => self.move_record(|v| v.next()),
                    Message::PreviousRecord => self.move_record(|v| v.previous()),
                    Message::FirstRecord => self.move_record(|v| v.first()),
                    Message::LastRecord => self.move_record(|v| v.last()),
                    Message::MoveUp => self.move_filter_selection_up(),
                    Message::MoveDown => self.move_filter_selection_down(),
                    Message::ScrollUp => {
                        self.record_offset = self.record_offset.saturating_sub(self.page_size)
                    }
                    Message::ScrollDown => self.scroll_record_down(),
                    Message::Enter => self.enter(),
                    Message::ApplyFilters => self.apply_filters(),
                    Message::ClearFilters => self.clear_filters(),
                    Message::OpenFile => self.enter_cmd_mode(CMDMode::OpenFile, ""),
                    Message::ExportFile => self.enter_cmd_mode(CMDMode::ExportFile, "filtered.csv"),
                    Message::CopyRecord => self.copy_record(),
                    Message::Help => self.show_help(),
                    _ => (),
                },
                Modus::PICKER => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveUp => self.move_picker_selection_up(1),
                    Message::MoveDown => self.move_picker_selection_down(1),
                    Message::ScrollUp => self.move_picker_selection_up(self.page_size),
                    Message::ScrollDown => self.move_picker_selection_down(self.page_size),
                    Message::Enter => self.enter(),
                    Message::Exit => self.exit(),
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Enter | Message::Help => self.exit(),
                    _ => (),
                },
                Modus::CMDINPUT => match msg {
                    Message::Quit => self.quit(),
                    Message::RawKey(key) => self.raw_input(key),
                    _ => (),
                },
            }
        }
        self.update_uidata();
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn build_filters(&mut self) {
        let mut filters = Vec::new();
        if self.view.table().is_some_and(|t| t.has_column(&self.config.id_column)) {
            filters.push(FilterEntry {
                column: self.config.id_column.clone(),
                kind: FilterKind::Search,
            });
        }
        for column in self.config.filter_columns.iter() {
            if column != &self.config.id_column
                && self.view.table().is_some_and(|t| t.has_column(column))
            {
                filters.push(FilterEntry {
                    column: column.clone(),
                    kind: FilterKind::Pick,
                });
            }
        }
        trace!("Sidebar filters: {:?}", filters);
        self.filters = filters;
        self.selected_filter = 0;
    }

    fn move_record<F: FnOnce(&mut DatasetView)>(&mut self, step: F) {
        let before = self.view.cursor();
        step(&mut self.view);
        if self.view.cursor() != before {
            self.record_offset = 0;
        }
    }

    fn scroll_record_down(&mut self) {
        let nfields = self.view.columns().len();
        self.record_offset =
            std::cmp::min(self.record_offset + self.page_size, nfields.saturating_sub(1));
    }

    /// Pages scroll by the number of record fields that fit on screen.
    fn resize(&mut self, height: usize) {
        self.page_size = std::cmp::max(height.saturating_sub(RECORD_CHROME_ROWS), 1);
        let nfields = self.view.columns().len();
        self.record_offset = std::cmp::min(self.record_offset, nfields.saturating_sub(1));
        trace!("Resized to {} rows, page size {}", height, self.page_size);
    }

    fn move_filter_selection_up(&mut self) {
        self.selected_filter = self.selected_filter.saturating_sub(1);
    }

    fn move_filter_selection_down(&mut self) {
        if self.selected_filter + 1 < self.filters.len() {
            self.selected_filter += 1;
        }
    }

    fn move_picker_selection_up(&mut self, size: usize) {
        if let Some(picker) = self.picker.as_mut() {
            picker.curser_row = picker.curser_row.saturating_sub(size);
        }
    }

    fn move_picker_selection_down(&mut self, size: usize) {
        if let Some(picker) = self.picker.as_mut() {
            let last = picker.values.len().saturating_sub(1);
            picker.curser_row = std::cmp::min(picker.curser_row + size, last);
        }
    }

    fn enter(&mut self) {
        match self.modus {
            Modus::BROWSE => {
                let Some(entry) = self.filters.get(self.selected_filter).cloned() else {
                    return;
                };
                let current = self
                    .view
                    .criterion(&entry.column)
                    .map(|c| c.text().to_string())
                    .unwrap_or_default();
                match entry.kind {
                    FilterKind::Search => self.enter_cmd_mode(CMDMode::SearchId, &current),
                    FilterKind::Pick => self.open_picker(&entry.column, &current),
                }
            }
            Modus::PICKER => {
                if let Some(picker) = self.picker.take() {
                    let value = picker.values[picker.curser_row].clone();
                    self.view
                        .set_criterion(&picker.column, Some(Criterion::Equals(value.clone())));
                    self.set_status_message(format!(
                        "{} = {}, press a to apply",
                        picker.column,
                        if value.is_empty() { ANY_VALUE } else { value.as_str() }
                    ));
                }
                self.modus = Modus::BROWSE;
                self.previous_modus = Modus::PICKER;
            }
            Modus::POPUP => {}
            Modus::CMDINPUT => {}
        }
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::BROWSE => {}
            Modus::PICKER => {
                self.picker = None;
                self.modus = Modus::BROWSE;
                self.previous_modus = Modus::PICKER;
            }
            Modus::POPUP => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::POPUP;
            }
            Modus::CMDINPUT => {}
        }
    }

    fn open_picker(&mut self, column: &str, current: &str) {
        let mut values = vec![String::new()];
        values.extend(self.view.distinct_values(column));
        let curser_row = values.iter().position(|v| v == current).unwrap_or(0);
        trace!("Picker for {} with {} values", column, values.len());

        self.picker = Some(PickerView {
            column: column.to_string(),
            values,
            curser_row,
        });
        self.previous_modus = self.modus;
        self.modus = Modus::PICKER;
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn apply_filters(&mut self) {
        if !self.view.is_loaded() {
            self.set_status_message(NO_DATA);
            return;
        }
        self.view.apply_filters();
        self.record_offset = 0;
        let found = self.view.filtered_len();
        if found == 0 {
            self.set_status_message(NO_RECORDS);
        } else {
            self.set_status_message(format!("Found {found} record(s)"));
        }
    }

    fn clear_filters(&mut self) {
        if !self.view.is_loaded() {
            return;
        }
        self.view.clear_filters();
        self.record_offset = 0;
        self.set_status_message("Filters cleared");
    }

    fn copy_record(&mut self) {
        let Some(record) = self.view.current_record() else {
            self.set_status_message(NO_RECORDS);
            return;
        };
        let line = export::record_to_csv_line(&record);

        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    let err = TVError::Clipboard(e.to_string());
                    error!("{err}");
                    self.set_status_message(err.to_string());
                    return;
                }
            }
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.set_text(line) {
                Ok(_) => {
                    trace!("Copied record to clipboard.");
                    self.set_status_message("Copied record to clipboard");
                }
                Err(e) => {
                    let err = TVError::Clipboard(e.to_string());
                    error!("{err}");
                    self.set_status_message(err.to_string());
                }
            }
        }
    }

    fn raw_input(&mut self, key: KeyEvent) {
        if self.active_cmdinput {
            self.last_input = self.input.read(key);
            if self.last_input.finished {
                self.handle_cmd_input();
            }
        }
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode, prefill: &str) {
        trace!("Entering command mode {:?} ...", mode);
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);

        self.active_cmdinput = true;
        self.input.clear();
        self.input.set(prefill);
        self.last_input = self.input.get();
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {}", self.last_input.input);

        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;

        let cmd_mode = self.cmd_mode.take();
        if self.last_input.canceled {
            return;
        }
        let cmd_input = self.last_input.input.clone();
        match cmd_mode {
            Some(CMDMode::OpenFile) => self.open_file(&cmd_input),
            Some(CMDMode::ExportFile) => self.export_file(&cmd_input),
            Some(CMDMode::SearchId) => {
                let column = self.config.id_column.clone();
                self.view
                    .set_criterion(&column, Some(Criterion::Substring(cmd_input.clone())));
                if cmd_input.trim().is_empty() {
                    self.set_status_message(format!("{column} search cleared, press a to apply"));
                } else {
                    self.set_status_message(format!(
                        "{column} contains \"{}\", press a to apply",
                        cmd_input.trim()
                    ));
                }
            }
            None => {
                info!("Cmd mode is none!")
            }
        }
    }

    fn open_file(&mut self, path: &str) {
        if path.trim().is_empty() {
            return;
        }
        if let Err(e) = self.load_data_file(path) {
            error!("Loading {path} failed: {e}");
            self.set_status_message(format!("Upload rejected: {e}"));
        }
    }

    fn export_file(&mut self, path: &str) {
        if path.trim().is_empty() {
            return;
        }
        let result = loader::expand_path(path)
            .and_then(|p| export::export_csv(&self.view, &p).map(|n| (n, p)));
        match result {
            Ok((n, p)) => self.set_status_message(format!("Exported {n} records to {}", p.display())),
            Err(e) => {
                error!("Export to {path} failed: {e}");
                self.set_status_message(format!("Export failed: {e}"));
            }
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn update_uidata(&mut self) {
        let filters = self
            .filters
            .iter()
            .map(|f| FilterLine {
                label: f.column.clone(),
                value: self
                    .view
                    .criterion(&f.column)
                    .map(|c| c.text().to_string())
                    .unwrap_or_default(),
                kind: Some(f.kind),
            })
            .collect();

        let (record, position, header_width) = match self.view.current_record() {
            Some(record) => {
                let fields = record.fields();
                let header_width = fields
                    .iter()
                    .map(|(name, _)| name.chars().count())
                    .max()
                    .unwrap_or(0);
                let data = fields
                    .iter()
                    .skip(self.record_offset)
                    .map(|(name, value)| {
                        let value = value.to_string().replace("\r\n", " ↵ ").replace('\n', " ↵ ");
                        (name.to_string(), value)
                    })
                    .collect();
                (
                    data,
                    Some((record.position, record.total)),
                    std::cmp::min(header_width, self.config.max_column_width),
                )
            }
            None => (Vec::new(), None, 0),
        };

        let placeholder = if self.view.is_loaded() { NO_RECORDS } else { NO_DATA };

        self.uidata = UIData {
            name: self
                .view
                .table()
                .map(|t| t.name().to_string())
                .unwrap_or_default(),
            filters,
            selected_filter: self.selected_filter,
            record,
            position,
            placeholder: placeholder.to_string(),
            header_width,
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
            picker: self.picker.as_ref().map(|p| PickerData {
                title: p.column.clone(),
                values: p
                    .values
                    .iter()
                    .map(|v| if v.is_empty() { ANY_VALUE.to_string() } else { v.clone() })
                    .collect(),
                selected: p.curser_row,
            }),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.active_cmdinput,
            status_message: self.status_message.clone(),
        };
    }
}
