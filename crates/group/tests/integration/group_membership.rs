//! Adding documents to a live group: ordering, rejection, gating, and the
//! automatic link-file path.

use esilink_group::LinkGroup;
use esilink_primitives::ViewKind;
use esilink_registry::DocMeta;

use crate::common::{self, ELECTRODES, SOLUTION_POINTS, TIME_FRAMES};

#[test]
fn added_recording_keeps_the_canonical_sort_order() {
	let dir = tempfile::tempdir().unwrap();
	let lines = [
		dir.path().join("rec1.sef").display().to_string(),
		dir.path().join("rec3.sef").display().to_string(),
	];
	let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
	let lm = common::write_lm(dir.path(), "session.lm", &refs);
	let (mut reg, _log) = common::registry();
	let mut group = LinkGroup::open(&mut reg, &lm).unwrap();

	let rec2 = reg.open_or_find(&dir.path().join("rec2.sef"), false).unwrap();
	assert!(group.add_to_group(&mut reg, rec2));

	let names: Vec<String> = group
		.members()
		.tracks
		.iter()
		.map(|d| reg.doc(*d).unwrap().title())
		.collect();
	assert_eq!(names, ["rec1", "rec2", "rec3"]);
	assert!(group.is_dirty(&reg));
}

#[test]
fn added_recording_claims_its_free_view() {
	let dir = tempfile::tempdir().unwrap();
	let lines = [dir.path().join("rec1.sef").display().to_string()];
	let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
	let lm = common::write_lm(dir.path(), "session.lm", &refs);
	let (mut reg, _log) = common::registry();
	let mut group = LinkGroup::open(&mut reg, &lm).unwrap();

	let rec2 = reg.open_or_find(&dir.path().join("rec2.sef"), false).unwrap();
	let free = reg.views_of(rec2)[0];
	assert_eq!(reg.view(free).unwrap().group(), None);

	assert!(group.add_to_group(&mut reg, rec2));

	assert_eq!(reg.view(free).unwrap().group(), Some(group.doc_id()));
	// Claimed, not duplicated.
	assert_eq!(reg.views_of(rec2).len(), 1);
}

#[test]
fn duplicates_self_and_segmentation_are_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let lines = [dir.path().join("rec1.sef").display().to_string()];
	let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
	let lm = common::write_lm(dir.path(), "session.lm", &refs);
	let source = common::ScriptedSource::default().with_override(
		dir.path().join("seg.sef"),
		DocMeta::Tracks {
			electrodes: ELECTRODES,
			time_frames: TIME_FRAMES,
			frequency_bands: 0,
			segmentation: true,
		},
	);
	let (mut reg, _log) = common::registry_with_source(source);
	let mut group = LinkGroup::open(&mut reg, &lm).unwrap();

	let rec1 = group.members().tracks[0];
	assert!(!group.add_to_group(&mut reg, rec1));
	assert!(!group.add_to_group(&mut reg, group.doc_id()));

	let seg = reg.open_or_find(&dir.path().join("seg.sef"), false).unwrap();
	assert!(!group.add_to_group(&mut reg, seg));
	assert_eq!(group.members().tracks.len(), 1);
}

#[test]
fn roi_candidates_are_validated_against_solution_points() {
	let dir = tempfile::tempdir().unwrap();
	let lm = common::standard_lm(dir.path());
	let source = common::ScriptedSource::default()
		.with_override(
			dir.path().join("bad.rois"),
			DocMeta::Rois { dimension: SOLUTION_POINTS + 3, rois: SOLUTION_POINTS + 5 },
		)
		.with_override(
			dir.path().join("good.rois"),
			// Matching on either the dimension or the ROI count suffices.
			DocMeta::Rois { dimension: 2, rois: SOLUTION_POINTS },
		);
	let (mut reg, log) = common::registry_with_source(source);
	let mut group = LinkGroup::open(&mut reg, &lm).unwrap();

	let bad = reg.open_or_find(&dir.path().join("bad.rois"), false).unwrap();
	assert!(!group.add_to_group(&mut reg, bad));
	assert!(group.members().rois.is_empty());
	assert!(!group.is_dirty(&reg));
	assert_eq!(log.messages().len(), 1);

	let good = reg.open_or_find(&dir.path().join("good.rois"), false).unwrap();
	assert!(group.add_to_group(&mut reg, good));
	assert_eq!(group.members().rois, [good]);
}

#[test]
fn second_volume_does_not_regenerate_views_or_interpolation() {
	let dir = tempfile::tempdir().unwrap();
	let lm = common::standard_lm(dir.path());
	let (mut reg, _log) = common::registry();
	let mut group = LinkGroup::open(&mut reg, &lm).unwrap();

	let interp_before = group.interpolation().cloned();
	let views_before: Vec<usize> =
		group.members().tracks.iter().map(|d| reg.views_of(*d).len()).collect();

	let vol2 = reg.open_or_find(&dir.path().join("head2.nii"), false).unwrap();
	assert!(group.add_to_group(&mut reg, vol2));

	assert_eq!(group.members().volumes.len(), 2);
	assert_eq!(group.interpolation().cloned(), interp_before);
	let views_after: Vec<usize> =
		group.members().tracks.iter().map(|d| reg.views_of(*d).len()).collect();
	assert_eq!(views_after, views_before);
}

#[test]
fn completing_the_inverse_combination_synthesizes_views() {
	let dir = tempfile::tempdir().unwrap();
	// No volume yet: potentials views only.
	let lines = [
		dir.path().join("cap.xyz").display().to_string(),
		dir.path().join("sp.spi").display().to_string(),
		dir.path().join("op.is").display().to_string(),
		dir.path().join("rec1.sef").display().to_string(),
	];
	let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
	let lm = common::write_lm(dir.path(), "session.lm", &refs);
	let (mut reg, _log) = common::registry();
	let mut group = LinkGroup::open(&mut reg, &lm).unwrap();

	let rec1 = group.members().tracks[0];
	let kinds = |reg: &esilink_registry::Registry| -> Vec<ViewKind> {
		reg.views_of(rec1).iter().map(|v| reg.view(*v).unwrap().kind).collect()
	};
	assert_eq!(kinds(&reg), [ViewKind::Tracks, ViewKind::Potentials]);
	assert!(group.interpolation().is_none());

	let vol = reg.open_or_find(&dir.path().join("head.nii"), false).unwrap();
	assert!(group.add_to_group(&mut reg, vol));

	assert_eq!(
		kinds(&reg),
		[ViewKind::Tracks, ViewKind::Potentials, ViewKind::InverseSolution]
	);
	assert!(group.interpolation().is_some());
}

#[test]
fn first_add_derives_the_link_file_path() {
	let dir = tempfile::tempdir().unwrap();
	let (mut reg, _log) = common::registry();
	let mut group = LinkGroup::new_empty(&mut reg);
	assert!(group.has_unspecified_path());
	assert!(group.commit(&mut reg).is_err());

	let rec1 = reg.open_or_find(&dir.path().join("rec1.sef"), false).unwrap();
	assert!(group.add_to_group(&mut reg, rec1));

	assert!(!group.has_unspecified_path());
	let path = reg.doc(group.doc_id()).unwrap().path.clone();
	assert!(path.is_absolute());
	assert_eq!(path.extension().and_then(|e| e.to_str()), Some("lm"));
	assert!(path.starts_with(dir.path()));

	group.commit(&mut reg).unwrap();
	assert!(path.exists());
	assert!(!group.is_dirty(&reg));
}

#[test]
fn merging_a_group_re_dispatches_its_members() {
	let dir = tempfile::tempdir().unwrap();
	let lm_a = {
		let lines = [dir.path().join("rec1.sef").display().to_string()];
		let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
		common::write_lm(dir.path(), "a.lm", &refs)
	};
	let lm_b = {
		let lines = [
			dir.path().join("rec2.sef").display().to_string(),
			dir.path().join("cap.xyz").display().to_string(),
		];
		let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
		common::write_lm(dir.path(), "b.lm", &refs)
	};
	let (mut reg, _log) = common::registry();
	let mut a = LinkGroup::open(&mut reg, &lm_a).unwrap();
	let b = LinkGroup::open(&mut reg, &lm_b).unwrap();

	assert!(a.add_group(&mut reg, &b));

	assert_eq!(a.members().tracks.len(), 2);
	assert_eq!(a.members().electrodes.len(), 1);
	// The members are shared, not stolen: b still lists and locks them.
	let rec2 = b.members().tracks[0];
	assert_eq!(reg.doc(rec2).unwrap().used_by().len(), 2);
}
