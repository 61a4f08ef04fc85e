//! Demo customer records for local runs and tests.

use chrono::{Duration, Utc};
use werkstatt_core::customer::{Customer, EditableField, Status};
use werkstatt_core::types::RecordId;

/// Six demo repair tickets with staggered creation times so the default
/// ordering (newest first) is visible straight away.
pub fn demo_records() -> Vec<(RecordId, Customer)> {
    let now = Utc::now();
    let record = |days_ago: i64,
                  name: &str,
                  address: &str,
                  phone: &str,
                  device: &str,
                  error_description: &str,
                  notes: &str,
                  status: Status,
                  ticket_type: Option<&str>| Customer {
        name: EditableField::new(name.to_string()),
        address: EditableField::new(address.to_string()),
        phone: EditableField::new(phone.to_string()),
        device: EditableField::new(device.to_string()),
        error_description: EditableField::new(error_description.to_string()),
        notes: EditableField::new(notes.to_string()),
        status: EditableField::new(status),
        error_code: None,
        ticket_type: ticket_type.map(|t| EditableField::new(t.to_string())),
        created_at: now - Duration::days(days_ago),
    };

    vec![
        (
            "1".to_string(),
            record(
                1,
                "Anna Schmidt",
                "Hauptstraße 12, 50667 Köln",
                "0221 4567890",
                "Miele W1 Classic",
                "Trommel dreht sich nicht mehr",
                "Kundin bringt das Gerät am Dienstag vorbei.",
                Status::InProgress,
                Some("KD"),
            ),
        ),
        (
            "2".to_string(),
            record(
                3,
                "Bernd Weber",
                "Lindenallee 8, 10115 Berlin",
                "030 2233445",
                "Bosch Serie 6",
                "Wasser läuft nicht ab, Fehler E18",
                "Ablaufpumpe getauscht, Testlauf ohne Befund.",
                Status::Completed,
                Some("KD"),
            ),
        ),
        (
            "3".to_string(),
            record(
                5,
                "Clara Fischer",
                "Gartenweg 3, 80331 München",
                "089 7788990",
                "Siemens iQ500",
                "Display flackert und Programm bricht ab",
                "",
                Status::Submitted,
                None,
            ),
        ),
        (
            "4".to_string(),
            record(
                8,
                "Dieter Braun",
                "Am Markt 15, 20095 Hamburg",
                "040 5566778",
                "AEG Lavamat",
                "Starkes Klopfen im Schleudergang",
                "Ersatzteil bestellt, Lieferung steht aus.",
                Status::Submitted,
                Some("Rkl"),
            ),
        ),
        (
            "5".to_string(),
            record(
                11,
                "Elif Yilmaz",
                "Bahnhofstraße 22, 60311 Frankfurt",
                "069 3344556",
                "Miele W1 Classic",
                "Türverriegelung defekt",
                "Reparatur abgeschlossen, Kundin informiert.",
                Status::ReadyForPickup,
                Some("KD"),
            ),
        ),
        (
            "6".to_string(),
            record(
                14,
                "Frank Keller",
                "Schulstraße 7, 70173 Stuttgart",
                "0711 9900112",
                "Liebherr CNef 4313",
                "Kühlt nicht mehr, Kompressor läuft dauerhaft",
                "",
                Status::InProgress,
                None,
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_six_records_with_distinct_ids() {
        let records = demo_records();
        assert_eq!(records.len(), 6);

        let mut ids: Vec<_> = records.iter().map(|(id, _)| id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn seed_covers_every_status() {
        let records = demo_records();
        for status in Status::ALL {
            assert!(
                records.iter().any(|(_, c)| c.status.value == status),
                "missing status {status}"
            );
        }
    }

    #[test]
    fn seed_creation_times_are_strictly_descending() {
        let records = demo_records();
        for pair in records.windows(2) {
            assert!(pair[0].1.created_at > pair[1].1.created_at);
        }
    }

    #[test]
    fn seed_fields_carry_no_edit_stamps() {
        for (_, customer) in demo_records() {
            assert!(customer.name.last_edited.is_none());
            assert!(customer.status.last_edited.is_none());
        }
    }
}
