//! Default value functions for serde deserialization.

pub fn scale() -> f32 {
    1.0
}

pub fn vacuum_radius() -> f32 {
    6.0
}

pub fn path_width() -> f32 {
    1.0
}

pub fn mop_path_width() -> f32 {
    12.0
}

pub fn obstacle_radius() -> f32 {
    4.0
}

pub fn charger_radius() -> f32 {
    6.0
}

pub fn virtual_wall_width() -> f32 {
    1.0
}

pub fn text_scale() -> u32 {
    2
}

pub fn poll_interval_secs() -> f32 {
    5.0
}

/// Device states during which the map is not refreshed (8 = charging)
pub fn non_refreshing_states() -> Vec<u32> {
    vec![8]
}
