//! Joystick actions of the Atari 2600.
use anyhow::{anyhow, Result};
use num_traits::FromPrimitive;

/// Joystick action as numbered by the Arcade Learning Environment.
///
/// Games accept a subset of these, their minimal action set.
/// [`AtariEnv`](crate::AtariEnv) takes an index into that set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, num_derive::FromPrimitive)]
#[repr(i32)]
pub enum AtariAction {
    Noop = 0,
    Fire = 1,
    Up = 2,
    Right = 3,
    Left = 4,
    Down = 5,
    UpRight = 6,
    UpLeft = 7,
    DownRight = 8,
    DownLeft = 9,
    UpFire = 10,
    RightFire = 11,
    LeftFire = 12,
    DownFire = 13,
    UpRightFire = 14,
    UpLeftFire = 15,
    DownRightFire = 16,
    DownLeftFire = 17,
}

impl AtariAction {
    /// Converts action ids reported by the emulator, keeping their order.
    ///
    /// An unknown id is an error, since dropping it would shift the indices
    /// of all later actions.
    pub fn from_ids(ids: &[i32]) -> Result<Vec<Self>> {
        ids.iter()
            .map(|&id| Self::from_i32(id).ok_or_else(|| anyhow!("unknown action id {}", id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_i32() {
        assert_eq!(AtariAction::from_i32(1), Some(AtariAction::Fire));
        assert_eq!(AtariAction::from_i32(17), Some(AtariAction::DownLeftFire));
        assert_eq!(AtariAction::from_i32(18), None);
    }

    #[test]
    fn test_from_ids_keeps_order() -> Result<()> {
        let actions = AtariAction::from_ids(&[0, 1, 3, 4])?;
        assert_eq!(
            actions,
            vec![
                AtariAction::Noop,
                AtariAction::Fire,
                AtariAction::Right,
                AtariAction::Left
            ]
        );
        Ok(())
    }

    #[test]
    fn test_from_ids_rejects_unknown_id() {
        let err = AtariAction::from_ids(&[0, 1, 42, 3]).unwrap_err();
        assert!(err.to_string().contains("42"));
    }
}
