use coreshuffle::{
    Command, CommandResponse, Direction, MoveError, MoveRecord, Position, Session,
    SessionConfig,
};

fn beavrs() -> Session {
    Session::from_config(&SessionConfig::default()).unwrap()
}

fn at(session: &Session, coordinate: &str) -> Position {
    session.shape().parse_coordinate(coordinate).unwrap()
}

/// A cycle that touches every primitive, including a displacing load and a
/// load that exhausts a slot.
fn busy_cycle(session: &mut Session) {
    let h8 = at(session, "H8");
    let g9 = at(session, "G9");
    let l1 = at(session, "L1");
    let c3 = at(session, "C3");
    let a5 = at(session, "A5");
    let fresh = session.inventory().id_at(2).unwrap();

    session.swap(h8, g9).unwrap();
    session.rotate(l1, Direction::Clockwise).unwrap();
    session.rotate(a5, Direction::CounterClockwise).unwrap();
    let retired = session.remove(c3, "suspected leaker").unwrap().created_slot().unwrap();
    session.load(c3, fresh).unwrap();
    session.load(h8, retired).unwrap();
    session.swap(c3, h8).unwrap();
}

#[test]
fn undo_all_restores_baseline() {
    let mut session = beavrs();
    let baseline = session.grid().clone();
    let stock = session.inventory().quantities();

    busy_cycle(&mut session);
    assert_eq!(session.history().len(), 7);
    assert!(session.grid().first_difference(&baseline).is_some());

    let buffer = session.undo_all().unwrap();
    assert_eq!(buffer.len(), 7);
    assert!(session.history().is_empty());
    assert_eq!(session.grid().first_difference(&baseline), None);
    assert_eq!(*session.grid(), baseline);
    assert_eq!(session.inventory().quantities(), stock);
}

#[test]
fn redo_reproduces_pre_undo_state() {
    let mut session = beavrs();
    busy_cycle(&mut session);
    let grid = session.grid().clone();
    let inventory = session.inventory().clone();
    let history = session.history().clone();

    let buffer = session.undo_all().unwrap();
    let outcomes = session.redo(&buffer).unwrap();
    assert_eq!(outcomes.len(), 7);
    assert_eq!(*session.grid(), grid);
    assert_eq!(*session.inventory(), inventory);
    assert_eq!(*session.history(), history);
}

#[test]
fn redo_keeps_slot_ids_and_descriptions() {
    let mut session = beavrs();
    let c3 = at(&session, "C3");
    let slot = session.remove(c3, "to the pool").unwrap().created_slot().unwrap();

    session.undo_all().unwrap();
    assert!(session.inventory().get(slot).is_none());
    session.redo_saved().unwrap();

    let item = session.inventory().get(slot).unwrap();
    assert_eq!(item.description, "to the pool");
    assert_eq!(item.assembly.label, "C3");
}

#[test]
fn undo_and_redo_through_commands() {
    let mut session = beavrs();
    let shape = session.shape().clone();
    for line in ["swap H8 G9", "rotate L1 cw", "load H8 1", "remove B3 dropped"] {
        let command = Command::parse_line(line, &shape).unwrap().unwrap();
        session.execute(command).unwrap();
    }

    assert_eq!(
        session.execute(Command::UndoAll).unwrap(),
        CommandResponse::Undone { moves: 4 }
    );
    assert_eq!(
        session.execute(Command::Redo).unwrap(),
        CommandResponse::Redone { moves: 4 }
    );
    // Nothing left to redo.
    assert_eq!(
        session.execute(Command::Redo).unwrap(),
        CommandResponse::Redone { moves: 0 }
    );
    assert_eq!(session.history().len(), 4);
}

#[test]
fn undo_reverts_displacement_after_primary() {
    let mut session = beavrs();
    let h8 = at(&session, "H8");
    let fresh = session.inventory().id_at(0).unwrap();
    let outcome = session.load(h8, fresh).unwrap();
    let steps: Vec<&str> = outcome.entry.steps().map(MoveRecord::name).collect();
    assert_eq!(steps, vec!["remove", "load"]);

    session.undo_all().unwrap();
    assert_eq!(session.grid().label_at(h8), "H8");
    assert_eq!(session.inventory().get(fresh).unwrap().quantity, 30);
    assert_eq!(session.inventory().len(), 3);
}

#[test]
fn forward_move_after_undo_drops_redo() {
    let mut session = beavrs();
    session.swap(at(&session, "H8"), at(&session, "G9")).unwrap();
    session.undo_all().unwrap();
    session.swap(at(&session, "H9"), at(&session, "G8")).unwrap();
    assert!(session.redo_buffer().is_empty());
    let redone = session.redo_saved().unwrap();
    assert!(redone.is_empty());
    assert_eq!(session.history().len(), 1);
}

#[test]
fn failed_redo_changes_nothing() {
    let mut session = beavrs();
    let h8 = at(&session, "H8");
    session.remove(h8, "out").unwrap();
    let buffer = session.undo_all().unwrap();

    // H8 is emptied again, so the saved removal no longer applies.
    session.remove(h8, "again").unwrap();
    let grid = session.grid().clone();
    let err = session.redo(&buffer).unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(*session.grid(), grid);
    assert_eq!(session.history().len(), 1);
    assert!(session.grid().get(h8).unwrap().is_empty());
}

#[test]
fn redoing_the_same_buffer_twice_is_rejected() {
    let mut session = beavrs();
    let h8 = at(&session, "H8");
    let fresh = session.inventory().id_at(0).unwrap();
    session.remove(h8, "out").unwrap();
    session.load(h8, fresh).unwrap();

    let buffer = session.undo_all().unwrap();
    session.redo(&buffer).unwrap();
    let grid = session.grid().clone();
    let inventory = session.inventory().clone();
    let history = session.history().clone();

    // The removal's slot is live again, so the stale buffer cannot replay.
    let err = session.redo(&buffer).unwrap_err();
    assert!(err.is_recoverable());
    assert!(matches!(
        err.as_move(),
        Some(MoveError::InvalidMove { position, .. }) if *position == h8
    ));
    assert!(!session.is_poisoned());
    assert_eq!(*session.grid(), grid);
    assert_eq!(*session.inventory(), inventory);
    assert_eq!(*session.history(), history);

    let (g9, g8) = (at(&session, "G9"), at(&session, "G8"));
    session.swap(g9, g8).unwrap();
    assert_eq!(session.history().len(), 3);
}

#[test]
fn rejected_moves_do_not_poison() {
    let mut session = beavrs();
    let h8 = at(&session, "H8");
    session.remove(h8, "out").unwrap();

    assert!(session.swap(h8, at(&session, "G9")).is_err());
    assert!(session.rotate(h8, Direction::Clockwise).is_err());
    assert!(session.commit_default().is_err());
    assert!(!session.is_poisoned());

    session.undo_all().unwrap();
    assert_eq!(session.grid().label_at(h8), "H8");
}
