use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget},
};

use crate::sources::SourceKind;

/// Indent prepended to wrapped continuation lines
const WRAP_INDENT: &str = "  ";

/// Render the source menu
pub fn render_menu(area: Rect, buf: &mut Buffer, selected: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Sources ")
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    block.render(area, buf);

    let items: Vec<ListItem> = SourceKind::ALL
        .iter()
        .enumerate()
        .map(|(idx, kind)| {
            let style = if idx == selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(Span::styled(format!(" {}", kind.label()), style)))
        })
        .collect();

    List::new(items).render(inner, buf);
}

/// Render the report panel: wrapped lines, windowed by the scroll offset
pub fn render_info(area: Rect, buf: &mut Buffer, kind: SourceKind, report: &str, scroll: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} Info ", kind.label()))
        .border_style(Style::default().fg(Color::Gray))
        .title_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);
    block.render(area, buf);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let wrapped: Vec<String> = report
        .lines()
        .flat_map(|line| wrap_line(line, inner.width as usize))
        .collect();

    let visible: Vec<Line> = wrapped
        .iter()
        .skip(scroll)
        .take(inner.height as usize)
        .map(|line| Line::from(Span::styled(line.clone(), Style::default().fg(Color::Green))))
        .collect();

    Paragraph::new(visible).render(inner, buf);
}

/// Render the one-line status bar
pub fn render_status_bar(
    area: Rect,
    buf: &mut Buffer,
    refreshing: bool,
    last_updated: Option<DateTime<Local>>,
) {
    let help = Span::styled(
        " \u{2191}/\u{2193} select \u{b7} PgUp/PgDn scroll \u{b7} r refresh \u{b7} q quit ",
        Style::default().fg(Color::Yellow).bg(Color::DarkGray),
    );

    let state = if refreshing {
        Span::styled(
            " Refreshing... ",
            Style::default().fg(Color::Cyan).bg(Color::DarkGray),
        )
    } else {
        let updated = last_updated
            .map(|at| format!(" Updated {} ", at.format("%H:%M:%S")))
            .unwrap_or_else(|| " Waiting for data ".to_string());
        Span::styled(updated, Style::default().fg(Color::Green).bg(Color::DarkGray))
    };

    Paragraph::new(Line::from(vec![help, state])).render(area, buf);
}

/// Split one report line to `width` columns. Continuation pieces carry a
/// two-space indent and correspondingly less content, so stripping the
/// indent and concatenating reconstructs the original line exactly.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width <= WRAP_INDENT.len() {
        return vec![line.to_string()];
    }

    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= width {
        return vec![line.to_string()];
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let take = if start == 0 {
            width
        } else {
            width - WRAP_INDENT.len()
        };
        let end = (start + take).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        if start == 0 {
            pieces.push(chunk);
        } else {
            pieces.push(format!("{}{}", WRAP_INDENT, chunk));
        }
        start = end;
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unwrap_pieces(pieces: &[String]) -> String {
        let mut rebuilt = String::new();
        for (idx, piece) in pieces.iter().enumerate() {
            if idx == 0 {
                rebuilt.push_str(piece);
            } else {
                rebuilt.push_str(piece.strip_prefix(WRAP_INDENT).unwrap());
            }
        }
        rebuilt
    }

    #[test]
    fn test_short_line_is_untouched() {
        assert_eq!(wrap_line("hello", 20), vec!["hello".to_string()]);
    }

    #[test]
    fn test_wrapping_is_lossless() {
        let line = "Model name:          AMD Ryzen 7 5800X 8-Core Processor with extras";
        let pieces = wrap_line(line, 20);

        assert!(pieces.len() > 1);
        assert_eq!(unwrap_pieces(&pieces), line);
    }

    #[test]
    fn test_wrapped_pieces_fit_the_width() {
        let line = "x".repeat(100);
        for piece in wrap_line(&line, 17) {
            assert!(piece.chars().count() <= 17);
        }
    }

    #[test]
    fn test_wrapping_is_idempotent() {
        let line = "a".repeat(64);
        for piece in wrap_line(&line, 16) {
            assert_eq!(wrap_line(&piece, 16), vec![piece.clone()]);
        }
    }

    #[test]
    fn test_wrapping_handles_multibyte_text() {
        let line = "температура процессора в норме, вентилятор работает тихо";
        let pieces = wrap_line(line, 10);
        assert_eq!(unwrap_pieces(&pieces), line);
    }

    #[test]
    fn test_degenerate_width_returns_line_unchanged() {
        assert_eq!(wrap_line("abcdef", 0), vec!["abcdef".to_string()]);
        assert_eq!(wrap_line("abcdef", 2), vec!["abcdef".to_string()]);
    }
}
