// lib/src/kits.rs

use chrono::Utc;

use models::{InventoryItem, KitAuditEntry, KitAuditReport, UsvbKit};
use uuid::Uuid;

/// Audits a kit template against an ambulance's current stock: one entry
/// per template material, shortfall clamped at zero when overstocked.
pub fn audit_kit(kit: &UsvbKit, ambulance_id: Uuid, items: &[InventoryItem]) -> KitAuditReport {
    let entries: Vec<KitAuditEntry> = kit
        .materials
        .iter()
        .map(|material| {
            let current_quantity = items
                .iter()
                .filter(|i| i.ambulance_id == ambulance_id && i.name == material.name)
                .map(|i| i.quantity)
                .sum();
            KitAuditEntry {
                material: material.name.clone(),
                target_quantity: material.target_quantity,
                current_quantity,
                shortfall: (material.target_quantity - current_quantity).max(0),
            }
        })
        .collect();
    let complete = entries.iter().all(|e| e.shortfall == 0);
    KitAuditReport {
        kit_id: kit.id,
        ambulance_id,
        entries,
        complete,
        audited_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{KitCategory, KitMaterial, MaterialKind, NewInventoryItem, NewUsvbKit};

    #[test]
    fn audit_reports_shortfall_per_material() {
        let kit = UsvbKit::from_new(NewUsvbKit {
            name: "Kit vía aérea".into(),
            category: KitCategory::Airway,
            materials: vec![
                KitMaterial { name: "Guedel nº3".into(), target_quantity: 2 },
                KitMaterial { name: "Mascarilla".into(), target_quantity: 3 },
            ],
        });
        let ambulance_id = Uuid::new_v4();
        let today = Utc::now().date_naive();
        let stocked = InventoryItem::from_new(
            NewInventoryItem {
                name: "Guedel nº3".into(),
                kind: MaterialKind::NonConsumable,
                quantity: 5,
                min_stock: 0,
                expiry_date: None,
                location: None,
            },
            ambulance_id,
            today,
        );

        let report = audit_kit(&kit, ambulance_id, &[stocked]);
        assert!(!report.complete);
        assert_eq!(report.entries[0].shortfall, 0);
        assert_eq!(report.entries[1].current_quantity, 0);
        assert_eq!(report.entries[1].shortfall, 3);
    }
}
