// lib/src/storage_engine/mod.rs

pub mod inmemory_storage;
pub mod sled_storage;
pub mod storage_engine;

pub use inmemory_storage::InMemoryFleetStore;
pub use sled_storage::SledFleetStore;
pub use storage_engine::FleetStore;

use models::errors::{FleetError, FleetResult};
use models::{Ambulance, AmpularioMaterial, InventoryItem, User};

// Unique-key validation shared by both store implementations. The reasons
// are surfaced verbatim to API callers, in the operators' language.

pub(crate) fn ensure_ambulance_unique(
    existing: &[Ambulance],
    candidate: &Ambulance,
) -> FleetResult<()> {
    for other in existing.iter().filter(|a| a.id != candidate.id) {
        if other.code == candidate.code {
            return Err(FleetError::Conflict("este código ya existe".to_string()));
        }
        if other.plate == candidate.plate {
            return Err(FleetError::Conflict("esta matrícula ya existe".to_string()));
        }
        if candidate.kit_number.is_some() && other.kit_number == candidate.kit_number {
            return Err(FleetError::Conflict(
                "este número de kit ya existe".to_string(),
            ));
        }
    }
    Ok(())
}

pub(crate) fn ensure_item_name_unique(
    items_of_ambulance: &[InventoryItem],
    candidate: &InventoryItem,
) -> FleetResult<()> {
    let duplicate = items_of_ambulance
        .iter()
        .any(|i| i.id != candidate.id && i.name == candidate.name);
    if duplicate {
        return Err(FleetError::Conflict(
            "este material ya existe en este vehículo".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_space_material_unique(
    materials_of_space: &[AmpularioMaterial],
    candidate: &AmpularioMaterial,
) -> FleetResult<()> {
    let duplicate = materials_of_space
        .iter()
        .any(|m| m.id != candidate.id && m.space_id == candidate.space_id && m.name == candidate.name);
    if duplicate {
        return Err(FleetError::Conflict(
            "este material ya existe en este espacio".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_user_unique(existing: &[User], candidate: &User) -> FleetResult<()> {
    for other in existing.iter().filter(|u| u.id != candidate.id) {
        if other.username == candidate.username {
            return Err(FleetError::Conflict("Username already exists".to_string()));
        }
        if other.email == candidate.email {
            return Err(FleetError::Conflict("Email already exists".to_string()));
        }
    }
    Ok(())
}
