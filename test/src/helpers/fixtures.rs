use std::sync::Arc;

use propdelta_shared::{DataType, EntityType, PropertyScope};

/// Number of client-exposed properties on [`avatar_type`]
pub const AVATAR_CLIENT_PROPERTIES: usize = 4;

/// An entity type with one property of each scope:
///
/// | local | name      | type                       | scope        | client |
/// |-------|-----------|----------------------------|--------------|--------|
/// | 0     | health    | INT32                      | AllClients   | 0      |
/// | 1     | secret    | UINT16                     | CellPrivate  |        |
/// | 2     | inventory | ARRAY of STRING            | OwnClient    | 1      |
/// | 3     | waypoints | ARRAY of ARRAY of INT16    | OtherClients | 2      |
/// | 4     | stats     | FIXED_DICT                 | AllClients   | 3      |
/// | 5     | home_cell | INT64                      | CellPublic   |        |
pub fn avatar_type() -> Arc<EntityType> {
    let stats = DataType::fixed_dict(vec![
        ("strength", DataType::UInt8),
        ("titles", DataType::array_of(DataType::String)),
    ]);

    EntityType::builder("Avatar")
        .add_property("health", DataType::Int32, PropertyScope::AllClients)
        .add_property("secret", DataType::UInt16, PropertyScope::CellPrivate)
        .add_property(
            "inventory",
            DataType::array_of(DataType::String),
            PropertyScope::OwnClient,
        )
        .add_property(
            "waypoints",
            DataType::array_of(DataType::array_of(DataType::Int16)),
            PropertyScope::OtherClients,
        )
        .add_property("stats", stats, PropertyScope::AllClients)
        .add_property("home_cell", DataType::Int64, PropertyScope::CellPublic)
        .build()
        .expect("Avatar property names are unique")
}
