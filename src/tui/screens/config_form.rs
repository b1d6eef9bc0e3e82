//! # Config Form
//!
//! One-page form over every configuration key, used by `ztl config`.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{
    config::{Config, SyncPlatform},
    error::{Error, Result},
    tui::{event::TuiEvent, widgets::TextInput, AppResult, TuiApp},
};

/// Configuration keys in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ZettelDir,
    Editor,
    JsonDataDir,
    ArchiveDir,
    BackupEnable,
    BackupRetention,
    BackupDir,
    TrashRetention,
    TrashDir,
    SyncEnable,
    SyncPlatform,
    SyncBucket,
    AwsProfile,
    AwsRegion,
}

impl Field {
    const ALL: [Self; 14] = [
        Self::ZettelDir,
        Self::Editor,
        Self::JsonDataDir,
        Self::ArchiveDir,
        Self::BackupEnable,
        Self::BackupRetention,
        Self::BackupDir,
        Self::TrashRetention,
        Self::TrashDir,
        Self::SyncEnable,
        Self::SyncPlatform,
        Self::SyncBucket,
        Self::AwsProfile,
        Self::AwsRegion,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::ZettelDir => "zettel_dir",
            Self::Editor => "editor",
            Self::JsonDataDir => "json_data_dir",
            Self::ArchiveDir => "archive_dir",
            Self::BackupEnable => "backup.enable",
            Self::BackupRetention => "backup.retention",
            Self::BackupDir => "backup.backup_dir",
            Self::TrashRetention => "trash.retention",
            Self::TrashDir => "trash.trash_dir",
            Self::SyncEnable => "sync.enable",
            Self::SyncPlatform => "sync.platform",
            Self::SyncBucket => "sync.bucket",
            Self::AwsProfile => "sync.aws_profile",
            Self::AwsRegion => "sync.aws_region",
        }
    }

    fn current(self, config: &Config) -> String {
        match self {
            Self::ZettelDir => config.zettel_dir.clone(),
            Self::Editor => config.editor.clone(),
            Self::JsonDataDir => config.json_data_dir.clone(),
            Self::ArchiveDir => config.archive_dir.clone(),
            Self::BackupEnable => config.backup.enable.to_string(),
            Self::BackupRetention => config.backup.retention.to_string(),
            Self::BackupDir => config.backup.backup_dir.clone(),
            Self::TrashRetention => config.trash.retention.to_string(),
            Self::TrashDir => config.trash.trash_dir.clone(),
            Self::SyncEnable => config.sync.enable.to_string(),
            Self::SyncPlatform => config.sync.platform.as_str().to_string(),
            Self::SyncBucket => config.sync.bucket.clone(),
            Self::AwsProfile => config.sync.aws_profile.clone(),
            Self::AwsRegion => config.sync.aws_region.clone(),
        }
    }

    fn apply(self, config: &mut Config, raw: &str) -> Result<()> {
        let value = raw.trim();
        match self {
            Self::ZettelDir => config.zettel_dir = required(self, value)?,
            Self::Editor => config.editor = required(self, value)?,
            Self::JsonDataDir => config.json_data_dir = required(self, value)?,
            Self::ArchiveDir => config.archive_dir = required(self, value)?,
            Self::BackupEnable => config.backup.enable = parse_bool(self, value)?,
            Self::BackupRetention => config.backup.retention = parse_days(self, value)?,
            Self::BackupDir => config.backup.backup_dir = required(self, value)?,
            Self::TrashRetention => config.trash.retention = parse_days(self, value)?,
            Self::TrashDir => config.trash.trash_dir = required(self, value)?,
            Self::SyncEnable => config.sync.enable = parse_bool(self, value)?,
            Self::SyncPlatform => config.sync.platform = value.parse::<SyncPlatform>()?,
            Self::SyncBucket => config.sync.bucket = value.to_string(),
            Self::AwsProfile => config.sync.aws_profile = value.to_string(),
            Self::AwsRegion => config.sync.aws_region = value.to_string(),
        }
        Ok(())
    }
}

fn required(field: Field, value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(Error::BadInput(format!("{} must not be empty", field.label())));
    }
    Ok(value.to_string())
}

fn parse_bool(field: Field, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Ok(true),
        "false" | "no" | "n" | "0" | "off" => Ok(false),
        _ => Err(Error::BadInput(format!(
            "{} must be true or false, got '{value}'",
            field.label()
        ))),
    }
}

fn parse_days(field: Field, value: &str) -> Result<u32> {
    value.parse().map_err(|_| {
        Error::BadInput(format!(
            "{} must be a whole number of days, got '{value}'",
            field.label()
        ))
    })
}

/// Editable view of a [`Config`].
pub struct ConfigForm {
    base: Config,
    inputs: Vec<TextInput>,
    focus: usize,
    error: Option<String>,
}

impl ConfigForm {
    pub fn new(config: Config) -> Self {
        let inputs = Field::ALL
            .iter()
            .map(|field| TextInput::new(field.label()).with_value(field.current(&config)))
            .collect();
        Self {
            base: config,
            inputs,
            focus: 0,
            error: None,
        }
    }

    /// Builds the configuration from the current field values.
    pub fn to_config(&self) -> Result<Config> {
        let mut config = self.base.clone();
        for (field, input) in Field::ALL.iter().zip(&self.inputs) {
            field.apply(&mut config, input.value())?;
        }
        Ok(config)
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.inputs.len();
    }

    fn focus_prev(&mut self) {
        self.focus = self.focus.checked_sub(1).unwrap_or(self.inputs.len() - 1);
    }

    fn submit(&mut self) -> Option<AppResult<Config>> {
        match self.to_config() {
            Ok(config) => Some(AppResult::Done(config)),
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<AppResult<Config>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Some(AppResult::Cancelled),
            KeyCode::Char('c') if ctrl => return Some(AppResult::Cancelled),
            KeyCode::Char('s') if ctrl => return self.submit(),
            KeyCode::Enter => return self.submit(),
            KeyCode::Down | KeyCode::Tab => self.focus_next(),
            KeyCode::Up | KeyCode::BackTab => self.focus_prev(),
            _ => {
                if self.inputs[self.focus].handle_key(key) {
                    self.error = None;
                }
            }
        }
        None
    }

    fn label_width(&self) -> usize {
        self.inputs
            .iter()
            .map(|input| input.label().len())
            .max()
            .unwrap_or(0)
    }
}

impl TuiApp for ConfigForm {
    type Output = Config;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<AppResult<Config>> {
        match event {
            TuiEvent::Key(key) => self.handle_key(*key),
            TuiEvent::Paste(text) => {
                self.inputs[self.focus].insert_text(text);
                None
            }
            TuiEvent::Resize(..) => None,
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).split(frame.area());

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" ztl configuration ");
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);

        let width = self.label_width();
        let rows = usize::from(inner.height).max(1);
        let first = self.focus.saturating_sub(rows - 1);
        for (offset, (index, input)) in self.inputs.iter().enumerate().skip(first).take(rows).enumerate() {
            let y = inner.y + u16::try_from(offset).unwrap_or(u16::MAX);
            let row = Rect::new(inner.x, y, inner.width, 1);
            input.render(row, frame.buffer_mut(), width, index == self.focus);
        }

        let (text, style) = self.error.as_ref().map_or_else(
            || {
                (
                    "↑/↓/Tab move  Enter/Ctrl+S save  Esc cancel".to_string(),
                    Style::default().fg(Color::DarkGray),
                )
            },
            |err| (err.clone(), Style::default().fg(Color::Red)),
        );
        let help = Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> TuiEvent {
        TuiEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(form: &mut ConfigForm, text: &str) {
        for c in text.chars() {
            form.handle_event(&key(KeyCode::Char(c)));
        }
    }

    fn clear(form: &mut ConfigForm) {
        form.handle_event(&TuiEvent::Key(KeyEvent::new(
            KeyCode::Char('u'),
            KeyModifiers::CONTROL,
        )));
    }

    #[test]
    fn test_unchanged_form_round_trips() {
        let config = Config::default();
        let form = ConfigForm::new(config.clone());
        assert_eq!(form.to_config().unwrap(), config);
    }

    #[test]
    fn test_edit_editor_and_save() {
        let mut form = ConfigForm::new(Config::default());
        form.handle_event(&key(KeyCode::Down));
        clear(&mut form);
        type_text(&mut form, "nvim");

        let result = form.handle_event(&TuiEvent::Key(KeyEvent::new(
            KeyCode::Char('s'),
            KeyModifiers::CONTROL,
        )));
        match result {
            Some(AppResult::Done(config)) => assert_eq!(config.editor, "nvim"),
            other => panic!("expected saved config, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_retention_keeps_form_open() {
        let mut form = ConfigForm::new(Config::default());
        for _ in 0..5 {
            form.handle_event(&key(KeyCode::Tab));
        }
        clear(&mut form);
        type_text(&mut form, "soon");

        assert!(form.handle_event(&key(KeyCode::Enter)).is_none());
        assert!(form.error.as_deref().unwrap().contains("backup.retention"));

        form.handle_event(&key(KeyCode::Backspace));
        assert!(form.error.is_none());
    }

    #[test]
    fn test_sync_fields_parse() {
        let mut config = Config::default();
        Field::SyncEnable.apply(&mut config, "yes").unwrap();
        Field::SyncPlatform.apply(&mut config, "S3").unwrap();
        assert!(config.sync.enable);
        assert_eq!(config.sync.platform, SyncPlatform::S3);
        assert!(Field::SyncPlatform.apply(&mut config, "ftp").is_err());
        assert!(Field::ZettelDir.apply(&mut config, "  ").is_err());
    }

    #[test]
    fn test_escape_cancels_and_focus_wraps() {
        let mut form = ConfigForm::new(Config::default());
        form.handle_event(&key(KeyCode::Up));
        assert_eq!(form.focus, Field::ALL.len() - 1);
        form.handle_event(&key(KeyCode::Down));
        assert_eq!(form.focus, 0);
        assert_eq!(form.handle_event(&key(KeyCode::Esc)), Some(AppResult::Cancelled));
    }
}
