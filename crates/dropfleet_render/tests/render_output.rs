use dropfleet_core::core_api::{NOT_UPDATED, RunNote, ShipRecord, UpgradeRecord, WalkOutcome};
use dropfleet_core::faction::Faction;
use dropfleet_render::{
    LogHeader, render_error_log, render_json, render_summary, write_ship_report, write_upgrade_report,
};

fn sample_ship() -> ShipRecord {
    ShipRecord {
        name: "New Orleans".to_string(),
        faction: Faction::Ucm,
        base_scale: 2.5,
        health: 12.0,
        signature: 6.0,
        points: 125.0,
        model_image: "http://old/model.png".to_string(),
        new_model_url: NOT_UPDATED.to_string(),
        card_front_image: "http://old/front.png".to_string(),
        new_card_front_url: "https://new/front.png".to_string(),
        object_name: "New Orleans card".to_string(),
        object_guid: "s1".to_string(),
        container_path: "Dropfleet > UCM Ships".to_string(),
    }
}

#[test]
fn ship_report_has_fixed_column_order() {
    let mut buf = Vec::new();
    write_ship_report(&mut buf, &[sample_ship()]).expect("report should render");
    let text = String::from_utf8(buf).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(
        lines[0],
        "name,faction,baseScale,health,sig,points,modelImage,new_model_url,cardFrontImage,new_card_front_url,object_name,object_guid,container_path"
    );
    assert_eq!(
        lines[1],
        "New Orleans,UCM,2.5,12,6,125,http://old/model.png,Not Updated,http://old/front.png,https://new/front.png,New Orleans card,s1,Dropfleet > UCM Ships"
    );
    assert_eq!(lines.len(), 2);
}

#[test]
fn upgrade_report_quotes_fields_with_commas() {
    let record = UpgradeRecord {
        name: "Kraken, Mk II".to_string(),
        faction: Faction::Scourge,
        points: 15.0,
        card_image: "http://old/up.png".to_string(),
        new_card_url: NOT_UPDATED.to_string(),
        object_name: "Kraken".to_string(),
        object_guid: "u1".to_string(),
        container_path: "Scourge Upgrades".to_string(),
    };
    let mut buf = Vec::new();
    write_upgrade_report(&mut buf, &[record]).expect("report should render");
    let text = String::from_utf8(buf).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(
        lines[0],
        "name,faction,points,cardImage,new_card_url,object_name,object_guid,container_path"
    );
    assert_eq!(
        lines[1],
        "\"Kraken, Mk II\",Scourge,15,http://old/up.png,Not Updated,Kraken,u1,Scourge Upgrades"
    );
}

#[test]
fn error_log_lists_only_problems_under_fixed_header() {
    let header = LogHeader {
        repository: "TemporalDistoriton/DropfleetTTS".to_string(),
        base_url: "https://raw.githubusercontent.com/TemporalDistoriton/DropfleetTTS/main"
            .to_string(),
        url_style: "raw".to_string(),
    };
    let notes = vec![
        RunNote::Excluded("content in ignored container: Old 2.0 Content".to_string()),
        RunNote::Error("ModelImage not found for X in UCM faction".to_string()),
        RunNote::Skipped("No images found for Y in PHR faction".to_string()),
    ];

    let log = render_error_log(&header, &notes);
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines[0], "UPDATE ERRORS LOG");
    assert_eq!(lines[1], "================");
    assert_eq!(lines[3], "Repository: TemporalDistoriton/DropfleetTTS");
    assert_eq!(lines[5], "URL style: raw");
    assert_eq!(
        &lines[8..],
        &[
            "ERROR: ModelImage not found for X in UCM faction",
            "SKIPPING: No images found for Y in PHR faction",
        ]
    );
    assert!(!log.contains("EXCLUDED"));
}

#[test]
fn summary_counts_outcome() {
    let outcome = WalkOutcome {
        ships: vec![sample_ship()],
        upgrades: Vec::new(),
        notes: vec![RunNote::Error("e".to_string())],
        modified: true,
        visited: 7,
    };
    let summary = render_summary(&outcome);
    assert!(summary.contains("Objects visited:  7"));
    assert!(summary.contains("Ship cards:       1"));
    assert!(summary.contains("Errors:           1"));
    assert!(summary.ends_with("Save changed:     yes"));
}

#[test]
fn json_view_keeps_records_and_note_lines() {
    let outcome = WalkOutcome {
        ships: vec![sample_ship()],
        notes: vec![RunNote::Skipped("No images found for Medea in PHR faction".to_string())],
        modified: true,
        visited: 4,
        ..WalkOutcome::default()
    };

    let json = render_json(&outcome);
    assert_eq!(json["visited"], 4);
    assert_eq!(json["modified"], true);
    assert_eq!(json["ships"][0]["faction"], "UCM");
    assert_eq!(json["ships"][0]["baseScale"], 2.5);
    assert_eq!(json["ships"][0]["points"], 125);
    assert_eq!(json["upgrades"].as_array().map(Vec::len), Some(0));
    assert_eq!(
        json["notes"][0],
        "SKIPPING: No images found for Medea in PHR faction"
    );
}
