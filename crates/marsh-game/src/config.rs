//! Gameplay tunables, grouped the way the settings file stores them

use serde::{Deserialize, Serialize};

use crate::collect::CollectorConfig;
use crate::player::{GroundProbeConfig, MovementConfig, RespawnConfig};
use crate::teleport::TeleportConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    pub movement: MovementConfig,
    pub ground_probe: GroundProbeConfig,
    pub collector: CollectorConfig,
    pub teleport: TeleportConfig,
    pub respawn: RespawnConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_parse_independently() {
        let text = r#"
            [movement]
            move_speed = 9.0

            [teleport]
            spin_speed = 360.0
        "#;
        let config: GameplayConfig = toml::from_str(text).expect("parses");
        assert_eq!(config.movement.move_speed, 9.0);
        assert_eq!(config.teleport.spin_speed, 360.0);
        assert_eq!(config.collector.pickup_radius, 1.0);
        assert_eq!(config.respawn.cooldown, 1.0);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = GameplayConfig::default();
        let text = toml::to_string(&config).expect("serializes");
        let back: GameplayConfig = toml::from_str(&text).expect("parses");
        assert_eq!(back.ground_probe.check_distance, config.ground_probe.check_distance);
    }
}
