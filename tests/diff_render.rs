mod support;

use blockreel::{DiffRenderer, Frame, PaintCommand, PaletteColor, RecordingSink};
use proptest::prelude::*;
use support::{Screen, frame_from};

fn frame_pair() -> impl Strategy<Value = (Frame, Frame)> {
    (1u32..12, 1u32..6).prop_flat_map(|(w, h)| {
        let n = (w * h) as usize;
        // A small palette makes equal neighbours and unchanged pixels common.
        let pixels = || prop::collection::vec(0u8..4, n);
        (pixels(), pixels()).prop_map(move |(a, b)| (frame_from(w, &a), frame_from(w, &b)))
    })
}

proptest! {
    #[test]
    fn repaint_turns_previous_screen_into_current((prev, cur) in frame_pair()) {
        let mut renderer = DiffRenderer::new();
        let mut sink = RecordingSink::new();
        let mut screen = Screen::new(cur.width(), cur.height());

        renderer.render(&prev, None, &mut sink).unwrap();
        screen.apply(&sink.take());
        prop_assert!(screen.shows(&prev));

        screen.reset_write_counts();
        let stats = renderer.render(&cur, Some(&prev), &mut sink).unwrap();
        let cmds = sink.take();
        screen.apply(&cmds);
        prop_assert!(screen.shows(&cur));

        let written: u64 = screen.writes.iter().map(|&n| u64::from(n)).sum();
        prop_assert_eq!(written, stats.cells);
        prop_assert!(screen.writes.iter().all(|&n| n <= 1));

        // A run never starts on an unchanged pixel.
        for cmd in &cmds {
            if let PaintCommand::MoveTo { row, col } = *cmd {
                let (x, y) = (u32::from(col), u32::from(row));
                prop_assert_ne!(prev.color_at(x, y).unwrap(), cur.color_at(x, y).unwrap());
            }
        }
    }

    #[test]
    fn first_frame_is_one_run_per_color_segment((_, cur) in frame_pair()) {
        let mut sink = RecordingSink::new();
        let stats = DiffRenderer::new().render(&cur, None, &mut sink).unwrap();

        let mut segments = 0u64;
        for y in 0..cur.height() {
            let row: Vec<PaletteColor> = cur.row(y).unwrap().collect();
            segments += 1 + row.windows(2).filter(|w| w[0] != w[1]).count() as u64;
        }
        prop_assert_eq!(stats.runs, segments);
        prop_assert_eq!(stats.cursor_moves, u64::from(cur.height()));
        prop_assert_eq!(stats.cells, u64::from(cur.width() * cur.height()));
    }

    #[test]
    fn identical_frames_cost_nothing((_, cur) in frame_pair()) {
        let mut sink = RecordingSink::new();
        let stats = DiffRenderer::new().render(&cur, Some(&cur), &mut sink).unwrap();
        prop_assert_eq!(stats.runs, 0);
        prop_assert!(sink.commands().is_empty());
    }
}

#[test]
fn repaint_only_touches_changed_region() {
    let prev = frame_from(6, &[0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1]);
    let cur = frame_from(6, &[0, 0, 3, 3, 0, 0, 1, 1, 1, 1, 1, 2]);

    let mut sink = RecordingSink::new();
    DiffRenderer::new()
        .render(&cur, Some(&prev), &mut sink)
        .unwrap();
    assert_eq!(
        sink.take(),
        vec![
            PaintCommand::MoveTo { row: 0, col: 2 },
            PaintCommand::SetBackground(PaletteColor::new(3).unwrap()),
            PaintCommand::WriteRun(2),
            PaintCommand::MoveTo { row: 1, col: 5 },
            PaintCommand::SetBackground(PaletteColor::new(2).unwrap()),
            PaintCommand::WriteRun(1),
        ]
    );
}

#[test]
fn format_then_render_paints_full_screen() {
    let cur = frame_from(3, &[5, 5, 6, 7, 7, 7]);
    let mut renderer = DiffRenderer::new();
    let mut sink = RecordingSink::new();
    renderer.format(3, 2, &mut sink).unwrap();
    renderer.render(&cur, None, &mut sink).unwrap();

    let mut screen = Screen::new(3, 2);
    screen.apply(sink.commands());
    assert!(screen.shows(&cur));
}
