use livewatch_core::{diff, Record, RecordId, RecordStatus, Snapshot};
use pretty_assertions::assert_eq;

fn snapshot(entries: &[(&str, RecordStatus)]) -> Snapshot {
    entries
        .iter()
        .map(|(id, status)| Record::new(*id, status.clone()))
        .collect()
}

fn ids(raw: &[&str]) -> Vec<RecordId> {
    raw.iter().map(|id| RecordId::from(*id)).collect()
}

fn mixed_snapshot() -> Snapshot {
    snapshot(&[
        ("1", RecordStatus::Pending),
        ("2", RecordStatus::InProgress),
        ("3", RecordStatus::Resolved),
        ("4", RecordStatus::Closed),
        ("5", RecordStatus::Other("Escalated".into())),
    ])
}

#[test]
fn identical_snapshots_produce_no_changes() {
    for s in [Snapshot::new(), mixed_snapshot()] {
        assert!(diff(&s, &s).is_empty());
    }
}

#[test]
fn first_observation_reports_everything_as_added() {
    let s = mixed_snapshot();
    let changes = diff(&Snapshot::new(), &s);

    assert_eq!(changes.added_ids(), ids(&["1", "2", "3", "4", "5"]));
    assert_eq!(changes.resolved_ids(), ids(&["3"]));
    assert!(changes.status_changed.is_empty());
}

#[test]
fn diff_is_repeatable_for_the_same_pair() {
    let old = snapshot(&[("1", RecordStatus::Pending), ("2", RecordStatus::Resolved)]);
    let new = snapshot(&[
        ("1", RecordStatus::Resolved),
        ("2", RecordStatus::InProgress),
        ("3", RecordStatus::Pending),
    ]);

    let first = diff(&old, &new);
    let second = diff(&old, &new);
    assert_eq!(first, second);
}

#[test]
fn added_pending_and_resolved_on_empty_base() {
    let new = snapshot(&[("1", RecordStatus::Pending), ("2", RecordStatus::Resolved)]);
    let changes = diff(&Snapshot::new(), &new);

    assert_eq!(changes.added_ids(), ids(&["1", "2"]));
    assert_eq!(changes.resolved_ids(), ids(&["2"]));
    assert_eq!(changes.status_changed_ids(), ids(&[]));
}

#[test]
fn pending_to_resolved_is_reported_only_as_resolved() {
    let old = snapshot(&[("1", RecordStatus::Pending)]);
    let new = snapshot(&[("1", RecordStatus::Resolved)]);
    let changes = diff(&old, &new);

    assert_eq!(changes.added_ids(), ids(&[]));
    assert_eq!(changes.resolved_ids(), ids(&["1"]));
    assert_eq!(changes.status_changed_ids(), ids(&[]));
}

#[test]
fn in_progress_to_pending_is_a_status_change() {
    let old = snapshot(&[("1", RecordStatus::InProgress)]);
    let new = snapshot(&[("1", RecordStatus::Pending)]);
    let changes = diff(&old, &new);

    assert_eq!(changes.added_ids(), ids(&[]));
    assert_eq!(changes.resolved_ids(), ids(&[]));
    assert_eq!(changes.status_changed_ids(), ids(&["1"]));
    assert_eq!(changes.status_changed[0].previous, RecordStatus::InProgress);
}

#[test]
fn staying_resolved_is_not_a_change() {
    let s = snapshot(&[("1", RecordStatus::Resolved)]);
    assert!(diff(&s, &s.clone()).is_empty());
}

#[test]
fn leaving_and_reentering_resolved_is_reported_each_time() {
    let resolved = snapshot(&[("1", RecordStatus::Resolved)]);
    let reopened = snapshot(&[("1", RecordStatus::InProgress)]);

    let out = diff(&resolved, &reopened);
    assert_eq!(out.status_changed_ids(), ids(&["1"]));
    assert!(out.resolved.is_empty());

    let back = diff(&reopened, &resolved);
    assert_eq!(back.resolved_ids(), ids(&["1"]));
    assert!(back.status_changed.is_empty());
}

#[test]
fn removed_records_are_not_reported() {
    let old = mixed_snapshot();
    assert!(diff(&old, &Snapshot::new()).is_empty());

    let shrunk = snapshot(&[("1", RecordStatus::Pending)]);
    assert!(diff(&old, &shrunk).is_empty());
}

#[test]
fn payload_only_edits_are_not_changes() {
    let old: Snapshot = [Record::new("1", RecordStatus::Pending).with_field("title", "Leaky tap")]
        .into_iter()
        .collect();
    let new: Snapshot = [Record::new("1", RecordStatus::Pending).with_field("title", "Leaking tap")]
        .into_iter()
        .collect();

    assert!(diff(&old, &new).is_empty());
}
