// Drag-reorder state machine: tie-break semantics, guaranteed cleanup,
// and the touch-layout fallback.

use notecanvas::models::block::BlockKind;
use notecanvas::models::drag::{DropEffect, DropOutcome};
use notecanvas::models::error::EditError;
use notecanvas::models::session::EditorSession;

fn session_with_blocks(n: usize) -> (EditorSession, Vec<String>) {
    let mut session = EditorSession::new();
    let ids = (0..n)
        .map(|_| session.insert_block(BlockKind::Text).id.clone())
        .collect();
    (session, ids)
}

fn ids(session: &EditorSession) -> Vec<String> {
    session
        .canvas()
        .blocks()
        .iter()
        .map(|b| b.id.clone())
        .collect()
}

#[test]
fn dragging_down_drops_after_the_target() {
    let (mut session, order) = session_with_blocks(4);

    session.block_drag_start(&order[1]).unwrap();
    let outcome = session.drop_on_block(&order[3]).unwrap();
    session.drag_end();

    assert_eq!(outcome, DropOutcome::Reordered);
    assert_eq!(
        ids(&session),
        vec![
            order[0].clone(),
            order[2].clone(),
            order[3].clone(),
            order[1].clone()
        ]
    );
}

#[test]
fn dragging_up_drops_before_the_target() {
    let (mut session, order) = session_with_blocks(4);

    session.block_drag_start(&order[2]).unwrap();
    session.drop_on_block(&order[0]).unwrap();
    session.drag_end();

    assert_eq!(
        ids(&session),
        vec![
            order[2].clone(),
            order[0].clone(),
            order[1].clone(),
            order[3].clone()
        ]
    );
}

#[test]
fn dropping_on_itself_changes_nothing() {
    let (mut session, order) = session_with_blocks(3);

    session.block_drag_start(&order[1]).unwrap();
    assert_eq!(session.drop_on_block(&order[1]).unwrap(), DropOutcome::Ignored);
    session.drag_end();

    assert_eq!(ids(&session), order);
}

#[test]
fn palette_drag_inserts_at_the_end_with_copy_effect() {
    let (mut session, order) = session_with_blocks(2);

    session.palette_drag_start(BlockKind::Checklist).unwrap();
    assert_eq!(session.drag_over_effect(), DropEffect::Copy);

    // Dropping on an existing block still appends: the new-item path has
    // canvas-end semantics regardless of the hovered block.
    let outcome = session.drop_on_block(&order[0]).unwrap();
    session.drag_end();

    let DropOutcome::Inserted { id } = outcome else {
        panic!("expected an insert outcome");
    };
    assert_eq!(session.canvas().len(), 3);
    assert_eq!(session.canvas().blocks()[2].id, id);
    assert_eq!(
        session.canvas().blocks()[2].kind(),
        Some(BlockKind::Checklist)
    );
}

#[test]
fn existing_drag_never_drops_on_the_canvas_background() {
    let (mut session, order) = session_with_blocks(2);
    session.block_drag_start(&order[0]).unwrap();
    assert_eq!(session.drop_on_canvas().unwrap(), DropOutcome::Ignored);
    session.drag_end();
    assert_eq!(ids(&session), order);
}

#[test]
fn drag_end_cleans_up_even_after_a_rejected_drop() {
    let (mut session, order) = session_with_blocks(2);

    session.block_drag_start(&order[0]).unwrap();
    assert!(matches!(
        session.drop_on_block("el-gone"),
        Err(EditError::UnknownBlock(_))
    ));

    // Cleanup still runs: the reference clears and the next drag works.
    assert_eq!(session.drag_end().as_deref(), Some(order[0].as_str()));
    assert!(session.drag_state().is_idle());
    assert!(session.block_drag_start(&order[1]).is_ok());
    session.drag_end();
}

#[test]
fn drop_with_no_active_drag_is_ignored() {
    let (mut session, order) = session_with_blocks(2);
    assert_eq!(session.drop_on_block(&order[0]).unwrap(), DropOutcome::Ignored);
    assert_eq!(session.drop_on_canvas().unwrap(), DropOutcome::Ignored);
}

#[test]
fn touch_layout_swaps_drag_for_tap_insert() {
    let (mut session, order) = session_with_blocks(1);
    session.set_touch_layout(true);

    assert_eq!(
        session.block_drag_start(&order[0]),
        Err(EditError::DragDisabled)
    );
    assert_eq!(
        session.palette_drag_start(BlockKind::Table),
        Err(EditError::DragDisabled)
    );

    let id = session.tap_insert("table");
    assert_eq!(session.canvas().blocks().last().unwrap().id, id);
}

#[test]
fn entering_touch_layout_cancels_a_live_drag() {
    let (mut session, order) = session_with_blocks(2);
    session.block_drag_start(&order[0]).unwrap();
    session.set_touch_layout(true);
    assert!(session.drag_state().is_idle());
}
