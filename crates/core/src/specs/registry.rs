//! Static schema registry for the twelve spec tables.
//!
//! `spec_kinds!` expands one entry per category into:
//! - a variant of [`SpecKind`] carrying slug, table and ordered columns,
//! - a record struct with one [`SpecValue`] field per column,
//! - a variant of [`SpecRecord`] wrapping that struct.
//!
//! Rows are decoded into the record type and then flattened, in column order,
//! into [`Specs`].

use tokio_rusqlite::rusqlite::{self, Row};

use super::{SpecValue, Specs, to_camel_case};

macro_rules! spec_kinds {
    ($(
        $(#[$meta:meta])*
        $kind:ident($record:ident) {
            slug: $slug:literal,
            table: $table:literal,
            columns: { $($field:ident: $column:literal),+ $(,)? } $(,)?
        }
    ),+ $(,)?) => {
        /// A known category kind with a dedicated spec table.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum SpecKind {
            $($(#[$meta])* $kind,)+
        }

        impl SpecKind {
            /// Every registered kind, in registry order.
            pub const ALL: &'static [SpecKind] = &[$(SpecKind::$kind,)+];

            /// Look up a kind by category slug. Unknown slugs have no schema.
            pub fn from_slug(slug: &str) -> Option<Self> {
                match slug {
                    $($slug => Some(SpecKind::$kind),)+
                    _ => None,
                }
            }

            pub fn slug(self) -> &'static str {
                match self {
                    $(SpecKind::$kind => $slug,)+
                }
            }

            /// Backing table name.
            pub fn table(self) -> &'static str {
                match self {
                    $(SpecKind::$kind => $table,)+
                }
            }

            /// Attribute columns in schema order, excluding `gear_id`.
            pub fn columns(self) -> &'static [&'static str] {
                match self {
                    $(SpecKind::$kind => &[$($column),+],)+
                }
            }

            /// Build a record from a normalized map; missing attributes are null.
            pub fn record_from_specs(self, specs: &Specs) -> SpecRecord {
                match self {
                    $(SpecKind::$kind => SpecRecord::$kind($record {
                        $($field: specs.get(&to_camel_case($column)).cloned().unwrap_or(SpecValue::Null),)+
                    }),)+
                }
            }

            /// Decode one row whose attribute columns are selected by name.
            pub fn decode(self, row: &Row<'_>) -> rusqlite::Result<SpecRecord> {
                match self {
                    $(SpecKind::$kind => $record::from_row(row).map(SpecRecord::$kind),)+
                }
            }
        }

        $(
            #[doc = concat!("Row of `", $table, "`.")]
            #[derive(Debug, Clone, PartialEq)]
            pub struct $record {
                $(pub $field: SpecValue,)+
            }

            impl $record {
                fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
                    Ok(Self { $($field: row.get($column)?,)+ })
                }

                /// Flatten into the generic map, keys in camelCase.
                pub fn into_specs(self) -> Specs {
                    let mut specs = Specs::new();
                    $(specs.insert(to_camel_case($column), self.$field);)+
                    specs
                }
            }
        )+

        /// A decoded spec row of any kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum SpecRecord {
            $($kind($record),)+
        }

        impl SpecRecord {
            pub fn kind(&self) -> SpecKind {
                match self {
                    $(SpecRecord::$kind(_) => SpecKind::$kind,)+
                }
            }

            pub fn into_specs(self) -> Specs {
                match self {
                    $(SpecRecord::$kind(r) => r.into_specs(),)+
                }
            }

            /// Attribute values in column order.
            pub fn values(&self) -> Vec<&SpecValue> {
                match self {
                    $(SpecRecord::$kind(r) => vec![$(&r.$field),+],)+
                }
            }
        }
    };
}

spec_kinds! {
    Camera(CameraSpecs) {
        slug: "camera",
        table: "specs_cameras",
        columns: {
            sensor: "sensor",
            resolution: "resolution",
            mount: "mount",
            dynamic_range: "dynamic_range",
            native_iso: "native_iso",
            media: "media",
            frame_rate: "frame_rate",
            weight: "weight",
        },
    },
    Lens(LensSpecs) {
        slug: "lens",
        table: "specs_lenses",
        columns: {
            focal_length: "focal_length",
            aperture: "aperture",
            mount: "mount",
            coverage: "coverage",
            focus_type: "focus_type",
            weight: "weight",
        },
    },
    Audio(AudioSpecs) {
        slug: "audio",
        table: "specs_audio",
        columns: {
            kind: "type",
            pattern: "pattern",
            freq_response: "freq_response",
            sensitivity: "sensitivity",
            max_spl: "max_spl",
            power: "power",
            connector: "connector",
            weight: "weight",
        },
    },
    Light(LightSpecs) {
        slug: "light",
        table: "specs_lights",
        columns: {
            kind: "type",
            power_draw: "power_draw",
            color_temp: "color_temp",
            cri: "cri",
            mount: "mount",
            control: "control",
            weight: "weight",
        },
    },
    Monitor(MonitorSpecs) {
        slug: "monitor",
        table: "specs_monitoring",
        columns: {
            screen: "screen",
            resolution: "resolution",
            brightness: "brightness",
            inputs: "inputs",
            power: "power",
            features: "features",
            dimensions: "dimensions",
            weight: "weight",
        },
    },
    Prop(PropSpecs) {
        slug: "prop",
        table: "specs_props",
        columns: {
            kind: "type",
            era: "era",
            material: "material",
            condition: "condition",
            quantity: "quantity",
            dimensions: "dimensions",
            power: "power",
            weight: "weight",
        },
    },
    Stabilizer(StabilizerSpecs) {
        slug: "stabilizer",
        table: "specs_stabilizers",
        columns: {
            kind: "type",
            max_payload: "max_payload",
            axes: "axes",
            battery_life: "battery_life",
            connectivity: "connectivity",
            dimensions: "dimensions",
            weight: "weight",
        },
    },
    Tripod(TripodSpecs) {
        slug: "tripod",
        table: "specs_tripods",
        columns: {
            head_type: "head_type",
            max_payload: "max_payload",
            bowl_size: "bowl_size",
            height_range: "height_range",
            material: "material",
            counterbalance: "counterbalance",
            weight: "weight",
        },
    },
    Wireless(WirelessSpecs) {
        slug: "wireless",
        table: "specs_wireless",
        columns: {
            range: "range",
            delay: "delay",
            resolution: "resolution",
            inputs: "inputs",
            freq: "freq",
            power: "power",
            multicast: "multicast",
            weight: "weight",
        },
    },
    Drone(DroneSpecs) {
        slug: "drone",
        table: "specs_drones",
        columns: {
            kind: "type",
            camera: "camera",
            res: "res",
            flight_time: "flight_time",
            transmission: "transmission",
            sensors: "sensors",
            speed: "speed",
            weight: "weight",
        },
    },
    Filter(FilterSpecs) {
        slug: "filter",
        table: "specs_filters",
        columns: {
            kind: "type",
            density: "density",
            size: "size",
            stops: "stops",
            effect: "effect",
            strength: "strength",
            mount: "mount",
            material: "material",
            weight: "weight",
        },
    },
    Grip(GripSpecs) {
        slug: "grip",
        table: "specs_grip",
        columns: {
            kind: "type",
            max_load: "max_load",
            max_height: "max_height",
            min_height: "min_height",
            footprint: "footprint",
            material: "material",
            mount: "mount",
            weight: "weight",
        },
    },
}

impl SpecKind {
    /// `SELECT gear_id, <columns> FROM <table> WHERE gear_id IN (?, ...)` for `n` ids.
    pub fn select_sql(self, n: usize) -> String {
        let placeholders = vec!["?"; n.max(1)].join(", ");
        let columns = self
            .columns()
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(", ");
        format!("SELECT gear_id, {columns} FROM {} WHERE gear_id IN ({placeholders})", self.table())
    }
}
