use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};
use retail_dashboard::app::{Dashboard, DataStatus};
use retail_dashboard::format::{format_count, truncate};
use retail_dashboard::pages::{ChartKind, ChartSpec, DeltaTone, MetricTile, NoteTone, Page, Section, TableView};

const SIDEBAR_WIDTH: u16 = 30;
const CHART_HEIGHT: u16 = 14;
const TABLE_MAX_HEIGHT: u16 = 16;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

pub fn render(f: &mut Frame, dashboard: &Dashboard, scroll: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // page tabs
            Constraint::Min(0),    // body
            Constraint::Length(1), // key help
        ])
        .split(f.area());

    render_header(f, dashboard, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(chunks[1]);

    render_sidebar(f, dashboard, body[0]);
    render_page(f, dashboard, scroll, body[1]);
    render_footer(f, chunks[2]);
}

/// Number of sections the body can be scrolled through.
pub fn section_count(dashboard: &Dashboard) -> usize {
    dashboard.view().sections.len()
}

fn render_header(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let (status_text, status_color) = match dashboard.status() {
        DataStatus::Loaded { records } => (format!("● {} records", format_count(*records as u64)), Color::Green),
        DataStatus::NotNeeded => ("○ no data needed".to_string(), Color::DarkGray),
        DataStatus::Unavailable { artifact } => (format!("✗ {artifact} unavailable"), Color::Red),
    };

    let titles: Vec<Line> = Page::ALL
        .iter()
        .enumerate()
        .map(|(i, p)| Line::from(format!("{} {}", i + 1, p.nav_label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(dashboard.page().index())
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    " Retail Analytics ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))
                .title(Span::styled(format!(" {status_text} "), Style::default().fg(status_color))),
        );

    f.render_widget(tabs, area);
}

fn render_sidebar(f: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let lines: Vec<Line> = dashboard
        .view()
        .sidebar
        .iter()
        .map(|l| match l.as_str() {
            "Navigation" | "Data Summary" => Line::from(Span::styled(
                l.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            _ if l.starts_with("- ") => Line::from(Span::styled(l.clone(), Style::default().fg(Color::DarkGray))),
            _ => Line::from(l.clone()),
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    f.render_widget(paragraph, area);
}

fn render_page(f: &mut Frame, dashboard: &Dashboard, scroll: usize, area: Rect) {
    let view = dashboard.view();
    let mut title = vec![Span::styled(
        view.title.clone(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    if let Some(subtitle) = &view.subtitle {
        title.push(Span::raw("  "));
        title.push(Span::styled(subtitle.clone(), Style::default().fg(Color::DarkGray)));
    }
    if scroll > 0 {
        title.push(Span::styled(format!("  (section {} of {})", scroll + 1, view.sections.len()), Style::default().fg(Color::DarkGray)));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    f.render_widget(Paragraph::new(Line::from(title)), chunks[0]);

    // Sections stack top to bottom from the scroll offset until space runs out.
    let content = chunks[1];
    let mut y = content.y;
    for section in view.sections.iter().skip(scroll) {
        let remaining = content.bottom().saturating_sub(y);
        if remaining < 3 {
            break;
        }
        let height = section_height(section).min(remaining);
        let rect = Rect::new(content.x, y, content.width, height);
        render_section(f, section, rect);
        y += height;
    }
}

fn section_height(section: &Section) -> u16 {
    match section {
        Section::Tiles { .. } => 5,
        Section::Table(t) => (t.rows.len() as u16 + 4).min(TABLE_MAX_HEIGHT),
        Section::Chart(c) => match c.kind {
            ChartKind::HorizontalBar | ChartKind::Share => (c.points.len() as u16 * 2 + 2).clamp(5, CHART_HEIGHT + 8),
            _ => CHART_HEIGHT,
        },
        Section::Note { lines, .. } => lines.len() as u16 + 2,
    }
}

fn render_section(f: &mut Frame, section: &Section, area: Rect) {
    match section {
        Section::Tiles { title, tiles } => render_tiles(f, title.as_deref(), tiles, area),
        Section::Table(table) => render_table(f, table, area),
        Section::Chart(chart) => match chart.kind {
            ChartKind::Line => render_line_chart(f, chart, area),
            ChartKind::HorizontalBar | ChartKind::VerticalBar => render_bar_chart(f, chart, area),
            ChartKind::Share => render_share_chart(f, chart, area),
        },
        Section::Note { title, lines, tone } => render_note(f, title, lines, *tone, area),
    }
}

fn section_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn render_tiles(f: &mut Frame, title: Option<&str>, tiles: &[MetricTile], area: Rect) {
    let area = match title {
        Some(title) => {
            let block = section_block(title);
            let inner = block.inner(area);
            f.render_widget(block, area);
            inner
        }
        None => area,
    };
    if tiles.is_empty() {
        return;
    }

    let constraints: Vec<Constraint> = tiles.iter().map(|_| Constraint::Ratio(1, tiles.len() as u32)).collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (tile, cell) in tiles.iter().zip(cells.iter()) {
        let mut lines = vec![Line::from(Span::styled(
            tile.value.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))];
        if let Some(delta) = &tile.delta {
            lines.push(Line::from(Span::styled(delta.clone(), Style::default().fg(delta_color(delta, tile.tone)))));
        }
        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(tile.label.clone(), Style::default().fg(Color::Yellow))),
        );
        f.render_widget(paragraph, *cell);
    }
}

/// Green for an improvement, red for a deterioration.
fn delta_color(delta: &str, tone: DeltaTone) -> Color {
    let falling = delta.trim_start().starts_with('-');
    match tone {
        DeltaTone::Neutral => Color::DarkGray,
        DeltaTone::Normal if falling => Color::Red,
        DeltaTone::Normal => Color::Green,
        DeltaTone::Inverse if falling => Color::Green,
        DeltaTone::Inverse => Color::Red,
    }
}

fn render_table(f: &mut Frame, table: &TableView, area: Rect) {
    let header_cells = table
        .columns
        .iter()
        .map(|h| Cell::from(h.clone()).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let widths: Vec<Constraint> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let widest = table
                .rows
                .iter()
                .map(|r| r[i].chars().count())
                .max()
                .unwrap_or(0)
                .max(c.chars().count());
            Constraint::Length(widest.min(40) as u16)
        })
        .collect();

    let rows: Vec<Row> = table
        .rows
        .iter()
        .map(|r| Row::new(r.iter().map(|c| Cell::from(truncate(c, 40)))))
        .collect();

    let widget = Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .block(section_block(&table.title));
    f.render_widget(widget, area);
}

fn render_line_chart(f: &mut Frame, chart: &ChartSpec, area: Rect) {
    let data: Vec<(f64, f64)> = chart
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value))
        .collect();
    let max = chart.points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    let last = chart.points.len().saturating_sub(1);

    let x_labels: Vec<Span> = match (chart.points.first(), chart.points.last()) {
        (Some(first), Some(end)) => vec![Span::raw(first.label.clone()), Span::raw(end.label.clone())],
        _ => Vec::new(),
    };
    let y_top = if max > 0.0 { max * 1.1 } else { 1.0 };

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let widget = Chart::new(vec![dataset])
        .block(section_block(&chart.title))
        .x_axis(
            Axis::default()
                .title(chart.x_label.clone())
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, last.max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_label.clone())
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, y_top])
                .labels(vec![Span::raw("0"), Span::raw(format!("{y_top:.1}"))]),
        );
    f.render_widget(widget, area);
}

/// Bar heights are integral, so values are scaled by 100 and the label shows the real value.
fn render_bar_chart(f: &mut Frame, chart: &ChartSpec, area: Rect) {
    let bars: Vec<Bar> = chart
        .points
        .iter()
        .map(|p| {
            Bar::default()
                .value((p.value.max(0.0) * 100.0).round() as u64)
                .text_value(format!("{:.1}", p.value))
                .label(Line::from(truncate(&p.label, 18)))
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();

    let mut widget = BarChart::default()
        .block(section_block(&chart.title))
        .data(BarGroup::default().bars(&bars))
        .bar_gap(1)
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    widget = match chart.kind {
        ChartKind::HorizontalBar => widget.direction(Direction::Horizontal).bar_width(1),
        _ => widget.bar_width(bar_width(area.width, chart.points.len())),
    };
    f.render_widget(widget, area);
}

fn bar_width(width: u16, bars: usize) -> u16 {
    if bars == 0 {
        return 1;
    }
    (width.saturating_sub(2) / bars as u16).saturating_sub(1).clamp(1, 12)
}

fn render_share_chart(f: &mut Frame, chart: &ChartSpec, area: Rect) {
    let bars: Vec<Bar> = chart
        .points
        .iter()
        .map(|p| {
            let share = p.share.unwrap_or(0.0);
            Bar::default()
                .value((share * 10.0).round() as u64)
                .text_value(format!("{share:.1}%"))
                .label(Line::from(truncate(&p.label, 18)))
                .style(Style::default().fg(Color::Magenta))
        })
        .collect();

    let widget = BarChart::default()
        .block(section_block(&chart.title))
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .max(1000)
        .value_style(Style::default().fg(Color::Black).bg(Color::Magenta));
    f.render_widget(widget, area);
}

fn render_note(f: &mut Frame, title: &str, lines: &[String], tone: NoteTone, area: Rect) {
    let color = match tone {
        NoteTone::Info => Color::Blue,
        NoteTone::Success => Color::Green,
        NoteTone::Warning => Color::Yellow,
        NoteTone::Error => Color::Red,
    };
    let text: Vec<Line> = lines.iter().map(|l| Line::from(l.clone())).collect();
    let paragraph = Paragraph::new(text).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(Span::styled(
                format!(" {title} "),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[←→ / h l / 1-5] ", Style::default().fg(Color::Yellow)),
        Span::raw("page  "),
        Span::styled("[↑↓ / j k] ", Style::default().fg(Color::Yellow)),
        Span::raw("scroll  "),
        Span::styled("[r] ", Style::default().fg(Color::Yellow)),
        Span::raw("reload  "),
        Span::styled("[c] ", Style::default().fg(Color::Yellow)),
        Span::raw("clear cache"),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
