use studio_history::{History, HistoryConfig, Recorded, Scene, Snapshot, StepOutcome, StepRefused};

#[derive(Debug, thiserror::Error)]
#[error("bad board snapshot")]
struct BadBoard;

/// Newline separated list of object names.
#[derive(Debug, Default)]
struct Board {
    items: Vec<String>,
    renders: usize,
}

impl Scene for Board {
    type Error = BadBoard;

    fn serialize(&self) -> Result<Snapshot, Self::Error> {
        Ok(Snapshot::new(self.items.join("\n")))
    }

    async fn restore(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        self.items = snapshot
            .as_str()
            .lines()
            .map(str::to_string)
            .collect();
        Ok(())
    }

    fn render(&mut self) {
        self.renders += 1;
    }
}

#[test]
fn add_image_then_text_walkthrough() {
    let mut board = Board::default();
    let mut history = History::for_scene(&board, HistoryConfig::default()).unwrap();
    let s0 = board.serialize().unwrap();

    board.items.push("image".into());
    history.record(&board);
    let s1 = board.serialize().unwrap();

    board.items.push("text".into());
    history.record(&board);
    let s2 = board.serialize().unwrap();

    assert_eq!(history.entries(), &[s0.clone(), s1.clone(), s2][..]);
    assert_eq!(history.cursor(), 2);

    let outcome = pollster::block_on(history.undo(&mut board));
    assert!(matches!(outcome, StepOutcome::Applied { cursor: 1 }));
    assert_eq!(board.serialize().unwrap(), s1);

    pollster::block_on(history.undo(&mut board));
    assert_eq!(history.cursor(), 0);
    assert_eq!(board.serialize().unwrap(), s0);

    pollster::block_on(history.redo(&mut board));
    assert_eq!(history.cursor(), 1);
    assert_eq!(board.serialize().unwrap(), s1);
    assert_eq!(board.renders, 3);
}

#[test]
fn undo_then_redo_leaves_scene_unchanged() {
    let mut board = Board::default();
    let mut history = History::for_scene(&board, HistoryConfig::default()).unwrap();
    for name in ["rect", "circle", "triangle"] {
        board.items.push(name.into());
        history.record(&board);
    }

    pollster::block_on(history.undo(&mut board));
    let before_redo = board.serialize().unwrap();
    pollster::block_on(history.redo(&mut board));
    pollster::block_on(history.undo(&mut board));
    assert_eq!(board.serialize().unwrap(), before_redo);
}

#[test]
fn boundaries_are_silent_no_ops() {
    let mut board = Board::default();
    let mut history = History::for_scene(&board, HistoryConfig::default()).unwrap();
    board.items.push("sticker".into());
    history.record(&board);

    for _ in 0..3 {
        pollster::block_on(history.undo(&mut board));
    }
    assert_eq!(history.cursor(), 0);
    let outcome = pollster::block_on(history.undo(&mut board));
    assert!(matches!(outcome, StepOutcome::Refused(StepRefused::AtStart)));

    for _ in 0..3 {
        pollster::block_on(history.redo(&mut board));
    }
    assert_eq!(history.cursor(), history.len() - 1);
    let outcome = pollster::block_on(history.redo(&mut board));
    assert!(matches!(outcome, StepOutcome::Refused(StepRefused::AtEnd)));
}

#[test]
fn new_edit_after_undo_discards_branch() {
    let mut board = Board::default();
    let mut history = History::for_scene(&board, HistoryConfig::default()).unwrap();
    for name in ["a", "b", "c"] {
        board.items.push(name.into());
        history.record(&board);
    }

    pollster::block_on(history.undo(&mut board));
    pollster::block_on(history.undo(&mut board));
    assert_eq!(history.cursor(), 1);

    board.items.push("z".into());
    assert_eq!(
        history.record(&board),
        Recorded::Appended {
            cursor: 2,
            discarded: 2
        }
    );
    let outcome = pollster::block_on(history.redo(&mut board));
    assert!(!outcome.is_applied());
    assert_eq!(history.current().as_str(), "a\nz");
}
