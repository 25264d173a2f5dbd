// handlers/elevated/mod.rs - Staff-only handlers (/api/admin/*)
//
// Mounted behind `require_staff_middleware` on top of the protected tier.

pub mod admin; // List, create, update and delete for every registered model
