use coreshuffle::{
    CoreView, DepletionHook, MoveError, NoDepletion, Position, Session, SessionConfig,
    ShuffleResult,
};

fn beavrs() -> Session {
    Session::from_config(&SessionConfig::default()).unwrap()
}

fn at(session: &Session, coordinate: &str) -> Position {
    session.shape().parse_coordinate(coordinate).unwrap()
}

/// Adds a fixed burnup step to every quadrant.
struct FlatBurn {
    step: f64,
    calls: usize,
}

impl DepletionHook for FlatBurn {
    fn name(&self) -> &str {
        "flat"
    }

    fn deplete(&mut self, core: &mut CoreView<'_>) -> ShuffleResult<()> {
        self.calls += 1;
        for (_, assembly) in core.assemblies_mut() {
            for burnup in &mut assembly.burnup {
                *burnup += self.step;
            }
        }
        Ok(())
    }
}

#[test]
fn incomplete_core_blocks_commit_without_mutation() {
    let mut session = beavrs();
    let h8 = at(&session, "H8");
    session.swap(at(&session, "G9"), at(&session, "G8")).unwrap();
    session.remove(h8, "retired").unwrap();

    let grid = session.grid().clone();
    let inventory = session.inventory().clone();
    let history = session.history().clone();
    let mut hook = FlatBurn { step: 1.0, calls: 0 };

    let err = session.commit(&mut hook).unwrap_err();
    assert!(matches!(
        err.as_move(),
        Some(MoveError::IncompleteCore { empty }) if empty == &vec![h8]
    ));
    assert_eq!(hook.calls, 0);
    assert_eq!(*session.grid(), grid);
    assert_eq!(*session.inventory(), inventory);
    assert_eq!(*session.history(), history);
    assert!(session.cycles().is_empty());
}

#[test]
fn commit_clears_history_and_moves_baseline() {
    let mut session = beavrs();
    let h8 = at(&session, "H8");
    let g9 = at(&session, "G9");
    session.swap(h8, g9).unwrap();

    let mut hook = FlatBurn { step: 2.5, calls: 0 };
    let cycle = session.commit(&mut hook).unwrap();
    assert_eq!(hook.calls, 1);
    assert_eq!(cycle.cycle, 1);
    assert_eq!(cycle.depletion, "flat");
    assert_eq!(cycle.moves.len(), 1);

    assert!(session.history().is_empty());
    assert!(session.redo_buffer().is_empty());
    assert_eq!(session.baseline().grid, *session.grid());
    assert!(session.grid().assemblies().all(|(_, a)| !a.moved));
    assert!(session.grid().assemblies().all(|(_, a)| a.burnup == [2.5; 4]));
    assert_eq!(session.grid().label_at(h8), "G9");

    // Undo after a commit is a no-op.
    let grid = session.grid().clone();
    let buffer = session.undo_all().unwrap();
    assert!(buffer.is_empty());
    assert_eq!(*session.grid(), grid);
}

#[test]
fn undo_stops_at_the_committed_baseline() {
    let mut session = beavrs();
    let h8 = at(&session, "H8");
    let g9 = at(&session, "G9");
    session.swap(h8, g9).unwrap();
    session.commit(&mut NoDepletion).unwrap();

    session.swap(h8, at(&session, "H9")).unwrap();
    session.undo_all().unwrap();
    assert_eq!(session.grid().label_at(h8), "G9");
    assert_eq!(session.grid().label_at(g9), "H8");
}

#[test]
fn exhausted_slots_are_forgotten_on_commit() {
    let mut session = beavrs();
    let h8 = at(&session, "H8");
    let retired = session.remove(h8, "inspection").unwrap().created_slot().unwrap();
    session.load(h8, retired).unwrap();
    assert_eq!(session.inventory().exhausted_len(), 1);

    session.commit(&mut NoDepletion).unwrap();
    assert_eq!(session.inventory().exhausted_len(), 0);
    assert_eq!(session.baseline().inventory, *session.inventory());
}

#[test]
fn radial_burnup_reddens_the_centre_most() {
    let mut session = beavrs();
    let centre = at(&session, "H8");
    let edge = at(&session, "A8");
    let record = session.commit_default().unwrap();
    assert_eq!(record.depletion, "radial-burnup");

    let red = |pos| {
        session.grid().assembly(pos).unwrap().quadrants.iter().map(|q| q.r).sum::<f64>()
    };
    assert!(red(centre) > red(edge));
    assert!(session
        .grid()
        .assemblies()
        .flat_map(|(_, a)| a.quadrants)
        .all(|q| (0.0..=255.0).contains(&q.r)));
}

#[test]
fn cycles_accumulate_with_fingerprints() {
    let mut session = beavrs();
    let first = session.commit_default().unwrap();
    session
        .swap(at(&session, "H8"), at(&session, "G9"))
        .unwrap();
    let second = session.commit_default().unwrap();

    assert_eq!(session.cycles().len(), 2);
    assert_eq!(second.cycle, 2);
    assert_ne!(first.fingerprint, second.fingerprint);
    assert_eq!(second.fingerprint, session.grid().fingerprint());
    assert_eq!(session.cycle_number(), 3);
    assert!(second.report.contains("(1 move)"));
}
