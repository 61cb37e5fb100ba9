use crate::clock::TimeSource;
use crate::config::Config;
use crate::factory::parse_time_of_day;
use crate::format::{date_strip, format_display, format_range};
use crate::model::{Task, TaskColor, TaskId};
use crate::planner::Planner;
use crate::timeline::Timeline;
use anyhow::Result;
use chrono::NaiveDateTime;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub fn run<C: TimeSource>(planner: Planner<C>, config: &Config) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(planner, config);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

/// Fires once per interval; the event loop asks it on every pass.
pub struct Ticker {
    interval: Duration,
    last: Instant,
}

impl Ticker {
    pub fn new(interval: Duration, start: Instant) -> Self {
        Ticker {
            interval,
            last: start,
        }
    }

    pub fn due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

struct App<C: TimeSource> {
    planner: Planner<C>,
    now: NaiveDateTime,
    ticker: Ticker,
    strip_before: u32,
    strip_after: u32,
    status: String,
    mode: Mode,
    focus: Focus,
    upcoming_idx: usize,
    previous_idx: usize,
}

enum Mode {
    Normal,
    Adding(TaskForm),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Focus {
    Current,
    Upcoming,
    Previous,
}

impl Focus {
    fn next(&self) -> Focus {
        match self {
            Focus::Current => Focus::Upcoming,
            Focus::Upcoming => Focus::Previous,
            Focus::Previous => Focus::Current,
        }
    }

    fn prev(&self) -> Focus {
        match self {
            Focus::Current => Focus::Previous,
            Focus::Upcoming => Focus::Current,
            Focus::Previous => Focus::Upcoming,
        }
    }
}

struct TaskForm {
    name: FieldValue,
    color: TaskColor,
    start: FieldValue,
    end: FieldValue,
    field: FormField,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum FormField {
    Name,
    Color,
    Start,
    End,
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if let Some((idx, _)) = self.value[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    fn move_right(&mut self) {
        if let Some(ch) = self.value[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    fn backspace(&mut self) {
        if let Some((idx, _)) = self.value[..self.cursor].char_indices().next_back() {
            self.value.drain(idx..self.cursor);
            self.cursor = idx;
        }
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl TaskForm {
    fn new(start: &str, end: &str) -> Self {
        TaskForm {
            name: FieldValue::new(""),
            color: TaskColor::Green,
            start: FieldValue::new(start),
            end: FieldValue::new(end),
            field: FormField::Name,
        }
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Name => FormField::Color,
            FormField::Color => FormField::Start,
            FormField::Start => FormField::End,
            FormField::End => FormField::Name,
        };
    }

    fn prev_field(&mut self) {
        self.field = match self.field {
            FormField::Name => FormField::End,
            FormField::Color => FormField::Name,
            FormField::Start => FormField::Color,
            FormField::End => FormField::Start,
        };
    }

    fn active_text_mut(&mut self) -> Option<&mut FieldValue> {
        match self.field {
            FormField::Name => Some(&mut self.name),
            FormField::Color => None,
            FormField::Start => Some(&mut self.start),
            FormField::End => Some(&mut self.end),
        }
    }
}

impl<C: TimeSource> App<C> {
    fn new(planner: Planner<C>, config: &Config) -> Self {
        let now = planner.now();
        App {
            planner,
            now,
            ticker: Ticker::new(config.tick_interval(), Instant::now()),
            strip_before: config.strip_days_before,
            strip_after: config.strip_days_after,
            status: "n new task • space toggle • q quit".into(),
            mode: Mode::Normal,
            focus: Focus::Current,
            upcoming_idx: 0,
            previous_idx: 0,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
            if self.ticker.due(Instant::now()) {
                trace!("tick");
                self.refresh();
            }
        }
        Ok(())
    }

    /// Reads the clock once; every view drawn until the next refresh uses it.
    fn refresh(&mut self) {
        self.now = self.planner.now();
        self.ensure_bounds();
    }

    fn timeline(&self) -> Timeline<'_> {
        self.planner.timeline_at(self.now)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Adding(_) => self.handle_form_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('n') => {
                self.refresh();
                let (start, end) = self.planner.form_prefill(self.now);
                self.mode = Mode::Adding(TaskForm::new(&start, &end));
                self.status = "New task (Tab/Shift-Tab move, ←→ color, Enter save, Esc cancel)".into();
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Up | KeyCode::Char('k') => match self.focus {
                Focus::Upcoming => self.upcoming_idx = self.upcoming_idx.saturating_sub(1),
                Focus::Previous => self.previous_idx = self.previous_idx.saturating_sub(1),
                Focus::Current => {}
            },
            KeyCode::Down | KeyCode::Char('j') => {
                match self.focus {
                    Focus::Upcoming => self.upcoming_idx += 1,
                    Focus::Previous => self.previous_idx += 1,
                    Focus::Current => {}
                }
                self.ensure_bounds();
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let close_form = match &mut mode {
            Mode::Adding(form) => self.process_form_key(form, key),
            Mode::Normal => true,
        };
        self.mode = if close_form { Mode::Normal } else { mode };
        Ok(false)
    }

    fn process_form_key(&mut self, form: &mut TaskForm, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.status = "Canceled".into();
                return true;
            }
            KeyCode::Enter => return self.try_submit(form),
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.prev_field(),
            KeyCode::Left => match form.active_text_mut() {
                Some(field) => field.move_left(),
                None => form.color = form.color.prev(),
            },
            KeyCode::Right => match form.active_text_mut() {
                Some(field) => field.move_right(),
                None => form.color = form.color.next(),
            },
            KeyCode::Backspace => {
                if let Some(field) = form.active_text_mut() {
                    field.backspace();
                }
            }
            KeyCode::Char(c) => {
                if key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    return false;
                }
                match form.active_text_mut() {
                    Some(field) => field.insert_char(c),
                    None if c == ' ' => form.color = form.color.next(),
                    None => {}
                }
            }
            _ => {}
        }
        false
    }

    fn try_submit(&mut self, form: &TaskForm) -> bool {
        let times = parse_time_of_day(&form.start.value)
            .and_then(|start| parse_time_of_day(&form.end.value).map(|end| (start, end)));
        let added = times.and_then(|(start, end)| {
            self.planner
                .add_task(&form.name.value, form.color.tag(), start, end)
        });
        match added {
            Ok(id) => {
                self.refresh();
                self.status = format!("Added {}", form.name.value.trim());
                debug!(%id, "added from form");
                true
            }
            Err(err) => {
                self.status = format!("Could not add: {}", err);
                false
            }
        }
    }

    fn selected_id(&self) -> Option<TaskId> {
        let timeline = self.timeline();
        match self.focus {
            Focus::Current => timeline.current.map(|t| t.id()),
            Focus::Upcoming => timeline.upcoming.get(self.upcoming_idx).map(|t| t.id()),
            Focus::Previous => timeline.previous.get(self.previous_idx).map(|t| t.id()),
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            self.status = "No task selected".into();
            return;
        };
        match self.planner.toggle_task(id) {
            Ok(()) => {
                let done = self
                    .planner
                    .store()
                    .get(id)
                    .map(|t| t.completed())
                    .unwrap_or(false);
                self.status = if done {
                    "Marked done".into()
                } else {
                    "Marked not done".into()
                };
            }
            Err(err) => debug!("toggle skipped: {}", err),
        }
        self.refresh();
    }

    fn ensure_bounds(&mut self) {
        let (upcoming, previous) = {
            let timeline = self.timeline();
            (timeline.upcoming.len(), timeline.previous.len())
        };
        self.upcoming_idx = self.upcoming_idx.min(upcoming.saturating_sub(1));
        self.previous_idx = self.previous_idx.min(previous.saturating_sub(1));
    }

    fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Min(4),
                Constraint::Min(4),
                Constraint::Length(3),
            ])
            .split(f.size());

        let timeline = self.timeline();
        self.draw_header(f, layout[0]);
        self.draw_current(f, layout[1], &timeline);
        self.draw_list(
            f,
            layout[2],
            "Upcoming",
            &timeline.upcoming,
            self.upcoming_idx,
            self.focus == Focus::Upcoming,
        );
        self.draw_list(
            f,
            layout[3],
            "Previous",
            &timeline.previous,
            self.previous_idx,
            self.focus == Focus::Previous,
        );
        self.draw_footer(f, layout[4]);

        if let Mode::Adding(form) = &self.mode {
            self.draw_form(f, form);
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let mut spans = vec![
            Span::styled(
                "dayplan ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format_display(self.now.time()),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("   "),
        ];
        for day in date_strip(self.now.date(), self.strip_before, self.strip_after) {
            let text = format!(" {} {} ", day.day, day.weekday);
            let style = if day.active {
                Style::default()
                    .bg(Color::Cyan)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(" "));
        }

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_current(&self, f: &mut ratatui::Frame<'_>, area: Rect, timeline: &Timeline<'_>) {
        let focused = self.focus == Focus::Current;
        let block = Block::default()
            .title(Span::styled(
                "Now",
                Style::default()
                    .fg(if focused { Color::Cyan } else { Color::Gray })
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                Color::Cyan
            } else {
                Color::DarkGray
            }));

        let (task, progress) = match (timeline.current, timeline.current_progress) {
            (Some(task), Some(progress)) => (task, progress),
            _ => {
                let empty = Paragraph::new("No active task right now")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block);
                f.render_widget(empty, area);
                return;
            }
        };

        let inner = block.inner(area);
        f.render_widget(block, area);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(2)])
            .split(inner);

        let title = Line::from(vec![
            Span::styled(check_mark(task), Style::default().fg(task_color(task.color()))),
            Span::raw(" "),
            Span::styled(
                task.name().to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        f.render_widget(Paragraph::new(title), rows[0]);

        let bar = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(9),
                Constraint::Min(10),
                Constraint::Length(9),
            ])
            .split(rows[1]);
        f.render_widget(
            Paragraph::new(format_display(task.start().time())).style(Style::default().fg(Color::Gray)),
            bar[0],
        );
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(task_color(task.color())).bg(Color::Rgb(22, 24, 30)))
            .ratio(progress)
            .label(format!("{:.0}%", progress * 100.0));
        f.render_widget(gauge, bar[1]);
        f.render_widget(
            Paragraph::new(format_display(task.end().time()))
                .alignment(Alignment::Right)
                .style(Style::default().fg(Color::Gray)),
            bar[2],
        );
    }

    fn draw_list(
        &self,
        f: &mut ratatui::Frame<'_>,
        area: Rect,
        title: &str,
        tasks: &[&Task],
        selected: usize,
        focused: bool,
    ) {
        let items: Vec<ListItem> = if tasks.is_empty() {
            vec![ListItem::new(Line::from(Span::styled(
                "(empty)",
                Style::default().fg(Color::DarkGray),
            )))]
        } else {
            tasks.iter().map(|t| task_item(t, title == "Previous")).collect()
        };
        let mut state = ListState::default();
        if focused && !tasks.is_empty() {
            state.select(Some(selected));
        }
        let list = List::new(items)
            .block(
                Block::default()
                    .title(Span::styled(
                        format!("{} ({})", title, tasks.len()),
                        Style::default()
                            .fg(if focused { Color::Cyan } else { Color::Gray })
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(if focused {
                        Color::Cyan
                    } else {
                        Color::DarkGray
                    })),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::LightCyan)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let help = Line::from(vec![
            Span::styled("Tab", Style::default().fg(Color::LightCyan)),
            Span::raw(" focus  "),
            Span::styled("↑↓ / j k", Style::default().fg(Color::LightCyan)),
            Span::raw(" browse  "),
            Span::styled("space", Style::default().fg(Color::LightGreen)),
            Span::raw(" toggle  "),
            Span::styled("n", Style::default().fg(Color::LightMagenta)),
            Span::raw(" new  "),
            Span::styled("q", Style::default().fg(Color::LightRed)),
            Span::raw(" quit"),
        ]);
        let paragraph = Paragraph::new(vec![help, Line::from(self.status.clone())])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(paragraph, area);
    }

    fn draw_form(&self, f: &mut ratatui::Frame<'_>, form: &TaskForm) {
        let area = centered_rect(60, 50, f.size());
        let mut lines = Vec::new();
        lines.push(field_line("Name", &form.name, form.field == FormField::Name));
        lines.push(color_line(form.color, form.field == FormField::Color));
        lines.push(field_line(
            "Start (HH:MM)",
            &form.start,
            form.field == FormField::Start,
        ));
        lines.push(field_line(
            "End (HH:MM)",
            &form.end,
            form.field == FormField::End,
        ));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter to save • Esc to cancel • Tab/Shift-Tab to move • an end before the start runs past midnight",
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(Span::styled(
                        "New Task",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn task_color(color: TaskColor) -> Color {
    match color {
        TaskColor::Red => Color::LightRed,
        TaskColor::Green => Color::LightGreen,
        TaskColor::Blue => Color::LightBlue,
        TaskColor::Orange => Color::Rgb(255, 165, 0),
    }
}

/// Short badge shown next to a task, picked from keywords in its name.
fn task_glyph(name: &str) -> String {
    let lower = name.to_lowercase();
    if lower.contains("meet") {
        return "👤".into();
    }
    if ["code", "front", "back"].iter().any(|k| lower.contains(k)) {
        return "</>".into();
    }
    if ["food", "break", "dinner"].iter().any(|k| lower.contains(k)) {
        return "☕".into();
    }
    name.chars()
        .next()
        .map(|c| c.to_uppercase().collect::<String>())
        .unwrap_or_default()
}

fn check_mark(task: &Task) -> &'static str {
    if task.completed() {
        "[x]"
    } else {
        "[ ]"
    }
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn task_item(task: &Task, previous: bool) -> ListItem<'static> {
    let color = task_color(task.color());
    let name_style = if previous {
        Style::default().fg(Color::Gray).add_modifier(Modifier::DIM)
    } else {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    };
    let spans = vec![
        Span::styled(
            format!("{:^5}", task_glyph(task.name())),
            Style::default().fg(Color::Black).bg(color),
        ),
        Span::raw(" "),
        Span::styled(format!("{:<32}", truncate_text(task.name(), 32)), name_style),
        Span::styled(
            format!("{:>22}", format_range(task.start(), task.end())),
            Style::default().fg(Color::LightYellow),
        ),
        Span::raw("  "),
        Span::styled(check_mark(task), Style::default().fg(color)),
    ];
    ListItem::new(Line::from(spans))
}

fn field_line(label: &str, field: &FieldValue, active: bool) -> Line<'static> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    Line::from(vec![
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(text, value_style),
    ])
}

fn color_line(selected: TaskColor, active: bool) -> Line<'static> {
    let mut spans = vec![Span::styled(
        "Color: ",
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD | Modifier::DIM),
    )];
    for color in TaskColor::ALL {
        let mut style = Style::default().fg(task_color(color));
        if color == selected {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            if active {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
        }
        spans.push(Span::styled(format!(" {} ", color.label()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}
