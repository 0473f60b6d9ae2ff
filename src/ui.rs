use crate::app::App;
use crate::render::GlobeLayers;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    render_globe(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_globe(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Globe ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layers = app
        .renderer
        .render(inner.width as usize, inner.height as usize, &app.controller, &app.globe);
    frame.render_widget(GlobeWidget { layers }, inner);
}

/// Braille layers with marker labels on top
struct GlobeWidget {
    layers: GlobeLayers,
}

impl Widget for GlobeWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for layer in &self.layers.layers {
            let (r, g, b) = layer.rgb;
            let color = Color::Rgb(r, g, b);
            for (col, row, ch) in layer.canvas.cells() {
                if col >= area.width as usize || row >= area.height as usize {
                    continue;
                }
                let (x, y) = (area.x + col as u16, area.y + row as u16);
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }

        let label_style = Style::default().fg(Color::Yellow);
        for (lx, ly, text) in &self.layers.labels {
            if *ly >= area.height || *lx >= area.width {
                continue;
            }
            let max_len = area.width.saturating_sub(*lx) as usize;
            for (i, ch) in text.chars().take(max_len).enumerate() {
                buf[(area.x + *lx + i as u16, area.y + *ly)].set_char(ch).set_style(label_style);
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let auto_rotate = app.controller.is_auto_rotating();
    let dim = Style::default().fg(Color::DarkGray);

    let status = Line::from(vec![
        Span::styled(" Hover: ", dim),
        Span::styled(app.hovered_label().to_string(), Style::default().fg(Color::White)),
        Span::styled(" | ", dim),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | Zoom: ", dim),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" ", dim),
        Span::styled(
            if auto_rotate { "[A]uto " } else { "[a]uto " },
            Style::default().fg(if auto_rotate { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if app.globe.earth_tilt() { "[T]ilt " } else { "[t]ilt " },
            Style::default().fg(if app.globe.earth_tilt() { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if app.renderer.show_graticule { "[G]rid " } else { "[g]rid " },
            Style::default().fg(if app.renderer.show_graticule { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled("| arrows:rotate z:zoom f:fly r:reset q:quit", dim),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
