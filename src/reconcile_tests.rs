// src/reconcile_tests.rs

#[cfg(test)]
mod tests {
    use crate::hrms_client::{AttendanceRecord, Employee, EmployeeRef, RecordId};
    use crate::reconcile::*;
    use chrono::NaiveDate;

    fn emp(id: Option<i64>, code: Option<&str>, name: &str) -> Employee {
        Employee {
            id,
            employee_id: code.map(str::to_string),
            full_name: Some(name.to_string()),
            name: None,
            email: None,
            department: None,
        }
    }

    fn record(
        id: Option<RecordId>,
        employee: EmployeeRef,
        date: &str,
        status: Option<&str>,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee: Some(employee),
            date: Some(date.to_string()),
            status: status.map(str::to_string),
        }
    }

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    const DATE: &str = "2024-03-01";

    // --- canonical keys ---

    #[test]
    fn canonical_key_matches_roster_id_first() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        assert_eq!(canonical_key(&roster, Some(&EmployeeRef::Id(1))), "1");
        // A stringified id is still an id match.
        assert_eq!(
            canonical_key(&roster, Some(&EmployeeRef::Code("1".to_string()))),
            "1"
        );
    }

    #[test]
    fn canonical_key_maps_code_onto_owning_id() {
        let roster = vec![
            emp(Some(1), Some("EMP001"), "Jane"),
            emp(Some(2), Some("EMP002"), "John"),
        ];
        assert_eq!(
            canonical_key(&roster, Some(&EmployeeRef::Code("EMP002".to_string()))),
            "2"
        );
    }

    #[test]
    fn canonical_key_for_code_without_id_is_the_code() {
        let roster = vec![emp(None, Some("EMP009"), "No Id")];
        assert_eq!(
            canonical_key(&roster, Some(&EmployeeRef::Code("EMP009".to_string()))),
            "EMP009"
        );
    }

    #[test]
    fn canonical_key_falls_back_to_raw_reference() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        assert_eq!(
            canonical_key(&roster, Some(&EmployeeRef::Code("GHOST".to_string()))),
            "GHOST"
        );
        assert_eq!(canonical_key(&roster, Some(&EmployeeRef::Id(99))), "99");
        assert_eq!(canonical_key(&roster, None), "");
    }

    #[test]
    fn roster_key_falls_back_id_code_position() {
        assert_eq!(roster_key(&emp(Some(5), Some("EMP005"), "A"), 0), "5");
        assert_eq!(roster_key(&emp(None, Some("EMP005"), "B"), 1), "EMP005");
        assert_eq!(roster_key(&emp(None, None, "C"), 4), "4");
    }

    // --- status projection ---

    #[test]
    fn status_projection_is_case_insensitive() {
        assert_eq!(AttendanceStatus::from_raw("present"), Some(AttendanceStatus::Present));
        assert_eq!(AttendanceStatus::from_raw("PRESENT"), Some(AttendanceStatus::Present));
        assert_eq!(AttendanceStatus::from_raw("Present"), Some(AttendanceStatus::Present));
        assert_eq!(AttendanceStatus::from_raw("absent"), Some(AttendanceStatus::Absent));
        assert_eq!(AttendanceStatus::from_raw("Late"), Some(AttendanceStatus::Absent));
        assert_eq!(AttendanceStatus::from_raw("on leave"), Some(AttendanceStatus::Absent));
    }

    #[test]
    fn blank_status_projects_to_nothing() {
        assert_eq!(AttendanceStatus::from_raw(""), None);
        assert_eq!(AttendanceStatus::from_raw("   "), None);
    }

    // --- deduplication ---

    #[test]
    fn duplicate_with_status_beats_duplicate_without() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        // The larger id loses here: it carries no status.
        let rows = vec![
            record(Some(RecordId::Num(3)), EmployeeRef::Id(1), DATE, Some("present")),
            record(Some(RecordId::Num(7)), EmployeeRef::Id(1), DATE, Some("")),
        ];
        let sheet = AttendanceSheet::new(d(DATE), roster.clone(), rows);
        assert_eq!(sheet.records().len(), 1);
        assert_eq!(sheet.records()[0].record.id, Some(RecordId::Num(3)));

        // Reversed arrival order, same outcome.
        let rows = vec![
            record(Some(RecordId::Num(7)), EmployeeRef::Id(1), DATE, None),
            record(Some(RecordId::Num(3)), EmployeeRef::Id(1), DATE, Some("present")),
        ];
        let sheet = AttendanceSheet::new(d(DATE), roster, rows);
        assert_eq!(sheet.records().len(), 1);
        assert_eq!(sheet.records()[0].record.id, Some(RecordId::Num(3)));
    }

    #[test]
    fn duplicate_with_larger_id_wins() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        let rows = vec![
            record(Some(RecordId::Num(3)), EmployeeRef::Id(1), DATE, Some("present")),
            record(Some(RecordId::Num(7)), EmployeeRef::Id(1), DATE, Some("absent")),
        ];
        let sheet = AttendanceSheet::new(d(DATE), roster.clone(), rows);
        assert_eq!(sheet.records()[0].record.id, Some(RecordId::Num(7)));

        let rows = vec![
            record(Some(RecordId::Num(7)), EmployeeRef::Id(1), DATE, Some("absent")),
            record(Some(RecordId::Num(3)), EmployeeRef::Id(1), DATE, Some("present")),
        ];
        let sheet = AttendanceSheet::new(d(DATE), roster, rows);
        assert_eq!(sheet.records()[0].record.id, Some(RecordId::Num(7)));
    }

    #[test]
    fn stringified_ids_compare_numerically() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        let rows = vec![
            record(Some(RecordId::Num(9)), EmployeeRef::Id(1), DATE, Some("absent")),
            record(
                Some(RecordId::Text("10".to_string())),
                EmployeeRef::Id(1),
                DATE,
                Some("present"),
            ),
        ];
        let sheet = AttendanceSheet::new(d(DATE), roster, rows);
        assert_eq!(
            sheet.records()[0].record.id,
            Some(RecordId::Text("10".to_string()))
        );
    }

    #[test]
    fn incomparable_ids_fall_back_to_latest_row() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        let rows = vec![
            record(None, EmployeeRef::Id(1), DATE, Some("present")),
            record(None, EmployeeRef::Id(1), DATE, Some("absent")),
        ];
        let sheet = AttendanceSheet::new(d(DATE), roster, rows);
        assert_eq!(
            sheet.records()[0].record.status.as_deref(),
            Some("absent")
        );
    }

    #[test]
    fn mixed_reference_forms_collapse_to_one_key() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        let rows = vec![
            record(Some(RecordId::Num(10)), EmployeeRef::Id(1), DATE, Some("Present")),
            record(
                Some(RecordId::Num(11)),
                EmployeeRef::Code("EMP001".to_string()),
                DATE,
                Some("Absent"),
            ),
        ];
        let sheet = AttendanceSheet::new(d(DATE), roster, rows);
        assert_eq!(sheet.records().len(), 1);
        assert_eq!(sheet.records()[0].key, "1");
        // Both rows had a status, so the larger id won.
        assert_eq!(
            sheet.statuses().get("1"),
            Some(&AttendanceStatus::Absent)
        );
    }

    // --- the full projection ---

    #[test]
    fn projection_covers_marked_blank_and_missing() {
        let roster = vec![
            emp(Some(1), Some("EMP001"), "Marked"),
            emp(Some(2), Some("EMP002"), "Blank"),
            emp(Some(3), Some("EMP003"), "Missing"),
        ];
        let rows = vec![
            record(Some(RecordId::Num(20)), EmployeeRef::Id(1), DATE, Some("PRESENT")),
            record(Some(RecordId::Num(21)), EmployeeRef::Id(2), DATE, Some(" ")),
        ];
        let sheet = AttendanceSheet::new(d(DATE), roster, rows);
        let statuses = sheet.statuses();
        assert_eq!(statuses.get("1"), Some(&AttendanceStatus::Present));
        // Blank status means not marked, not absent.
        assert_eq!(statuses.get("2"), None);
        assert_eq!(statuses.get("3"), None);
        assert_eq!(statuses.len(), 1);
    }

    #[test]
    fn projection_skips_rows_from_other_dates() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        let rows = vec![record(
            Some(RecordId::Num(5)),
            EmployeeRef::Id(1),
            "2024-02-29",
            Some("present"),
        )];
        let sheet = AttendanceSheet::new(d(DATE), roster, rows);
        assert_eq!(sheet.records().len(), 1);
        assert!(sheet.statuses().is_empty());
    }

    #[test]
    fn stale_references_keep_a_stable_key() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        let rows = vec![record(
            Some(RecordId::Num(30)),
            EmployeeRef::Code("GONE".to_string()),
            DATE,
            Some("present"),
        )];
        let sheet = AttendanceSheet::new(d(DATE), roster, rows);
        assert_eq!(
            sheet.statuses().get("GONE"),
            Some(&AttendanceStatus::Present)
        );
    }

    // --- staging and saving ---

    #[test]
    fn plan_save_creates_when_nothing_survives() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        let mut sheet = AttendanceSheet::new(d(DATE), roster, Vec::new());
        assert_eq!(sheet.plan_save("1"), None);

        sheet.stage("1", AttendanceStatus::Present);
        let action = sheet.plan_save("1");
        match action {
            Some(SaveAction::Create(payload)) => {
                assert_eq!(payload.employee, "1");
                assert_eq!(payload.date, DATE);
                assert_eq!(payload.status, "Present");
            }
            other => panic!("expected a create, got {:?}", other),
        }
    }

    #[test]
    fn plan_save_updates_when_a_record_has_a_server_id() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        let rows = vec![record(
            Some(RecordId::Num(42)),
            EmployeeRef::Id(1),
            DATE,
            Some("present"),
        )];
        let mut sheet = AttendanceSheet::new(d(DATE), roster, rows);
        sheet.stage("1", AttendanceStatus::Absent);
        match sheet.plan_save("1") {
            Some(SaveAction::Update { id, payload }) => {
                assert_eq!(id, RecordId::Num(42));
                assert_eq!(payload.status, "Absent");
            }
            other => panic!("expected an update, got {:?}", other),
        }
    }

    #[test]
    fn plan_save_creates_when_the_survivor_has_no_id() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        let rows = vec![record(None, EmployeeRef::Id(1), DATE, Some("present"))];
        let mut sheet = AttendanceSheet::new(d(DATE), roster, rows);
        sheet.stage("1", AttendanceStatus::Absent);
        assert!(matches!(
            sheet.plan_save("1"),
            Some(SaveAction::Create(_))
        ));
    }

    #[test]
    fn saved_record_folds_back_without_a_refetch() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        let mut sheet = AttendanceSheet::new(d(DATE), roster, Vec::new());

        // First save of the day: nothing on the server yet.
        sheet.stage("1", AttendanceStatus::Present);
        assert!(matches!(
            sheet.plan_save("1"),
            Some(SaveAction::Create(_))
        ));

        // The backend answers with the stored record and its fresh id.
        sheet.apply_saved(record(
            Some(RecordId::Num(42)),
            EmployeeRef::Id(1),
            DATE,
            Some("Present"),
        ));
        assert!(sheet.staged().is_empty());
        assert_eq!(
            sheet.statuses().get("1"),
            Some(&AttendanceStatus::Present)
        );

        // Changing one's mind now goes through an update of that id.
        sheet.stage("1", AttendanceStatus::Absent);
        match sheet.plan_save("1") {
            Some(SaveAction::Update { id, .. }) => assert_eq!(id, RecordId::Num(42)),
            other => panic!("expected an update, got {:?}", other),
        }
    }

    #[test]
    fn saved_record_replaces_the_row_with_the_same_id() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        let rows = vec![record(
            Some(RecordId::Num(42)),
            EmployeeRef::Id(1),
            DATE,
            Some("present"),
        )];
        let mut sheet = AttendanceSheet::new(d(DATE), roster, rows);
        sheet.apply_saved(record(
            Some(RecordId::Num(42)),
            EmployeeRef::Id(1),
            DATE,
            Some("Absent"),
        ));
        assert_eq!(sheet.records().len(), 1);
        assert_eq!(
            sheet.statuses().get("1"),
            Some(&AttendanceStatus::Absent)
        );
    }

    #[test]
    fn saved_record_without_id_rekeys_synthetically() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        let rows = vec![record(None, EmployeeRef::Id(1), DATE, Some("present"))];
        let mut sheet = AttendanceSheet::new(d(DATE), roster, rows);
        // The echo also lacks an id; employee and date give it its slot.
        sheet.apply_saved(record(None, EmployeeRef::Id(1), DATE, Some("Absent")));
        assert_eq!(sheet.records().len(), 1);
        assert_eq!(
            sheet.statuses().get("1"),
            Some(&AttendanceStatus::Absent)
        );
    }

    // --- dashboard stats ---

    #[test]
    fn stats_count_present_absent_and_unmarked() {
        let roster = vec![
            emp(Some(1), Some("EMP001"), "Here"),
            emp(Some(2), Some("EMP002"), "Away"),
            emp(Some(3), Some("EMP003"), "Unmarked"),
        ];
        let rows = vec![
            record(Some(RecordId::Num(1)), EmployeeRef::Id(1), DATE, Some("present")),
            record(Some(RecordId::Num(2)), EmployeeRef::Id(2), DATE, Some("absent")),
        ];
        let sheet = AttendanceSheet::new(d(DATE), roster, rows);
        let stats = DashboardStats::from_sheet(&sheet);
        assert_eq!(stats.total_employees, 3);
        assert_eq!(stats.present_today, 1);
        // Unmarked counts as absent on the overview.
        assert_eq!(stats.absent_today, 2);
    }

    #[test]
    fn stats_never_go_negative_on_stale_presents() {
        let roster = vec![emp(Some(1), Some("EMP001"), "Jane")];
        let rows = vec![
            record(Some(RecordId::Num(1)), EmployeeRef::Id(1), DATE, Some("present")),
            record(
                Some(RecordId::Num(2)),
                EmployeeRef::Code("GONE".to_string()),
                DATE,
                Some("present"),
            ),
        ];
        let sheet = AttendanceSheet::new(d(DATE), roster, rows);
        let stats = DashboardStats::from_sheet(&sheet);
        assert_eq!(stats.total_employees, 1);
        assert_eq!(stats.present_today, 2);
        assert_eq!(stats.absent_today, 0);
    }

    #[test]
    fn default_stats_are_all_zero() {
        let stats = DashboardStats::default();
        assert_eq!(stats.total_employees, 0);
        assert_eq!(stats.present_today, 0);
        assert_eq!(stats.absent_today, 0);
    }
}
