// Payload transforms applied to audio packets.
//
// A transform rewrites a packet in place, so its length can never change.
// Header packets are never passed through a transform.

use clap::ValueEnum;

/// A byte-buffer transform applied to every audio packet
pub trait PacketTransform {
    fn apply(&mut self, packet: &mut [u8]);
}

impl<F> PacketTransform for F
where
    F: FnMut(&mut [u8]),
{
    fn apply(&mut self, packet: &mut [u8]) {
        self(packet)
    }
}

/// Bitwise complement of every byte. Applying it twice restores the packet.
#[derive(Debug, Clone, Copy, Default)]
pub struct Complement;

impl PacketTransform for Complement {
    fn apply(&mut self, packet: &mut [u8]) {
        for byte in packet.iter_mut() {
            *byte = !*byte;
        }
    }
}

/// Leaves packets untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl PacketTransform for Identity {
    fn apply(&mut self, _packet: &mut [u8]) {}
}

/// Transforms selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransformKind {
    /// Bitwise complement of every byte
    #[default]
    Complement,
    /// Copy packets unchanged
    Identity,
}

impl PacketTransform for TransformKind {
    fn apply(&mut self, packet: &mut [u8]) {
        match self {
            TransformKind::Complement => Complement.apply(packet),
            TransformKind::Identity => Identity.apply(packet),
        }
    }
}

impl std::fmt::Display for TransformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformKind::Complement => write!(f, "complement"),
            TransformKind::Identity => write!(f, "identity"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_inverts_bytes() {
        let mut packet = vec![0x00, 0x01, 0x02, 0xff];
        Complement.apply(&mut packet);
        assert_eq!(packet, vec![0xff, 0xfe, 0xfd, 0x00]);
    }

    #[test]
    fn complement_twice_is_identity() {
        let original: Vec<u8> = (0..=255).collect();
        let mut packet = original.clone();
        let mut transform = TransformKind::Complement;
        transform.apply(&mut packet);
        assert_ne!(packet, original);
        transform.apply(&mut packet);
        assert_eq!(packet, original);
    }

    #[test]
    fn kinds_parse_by_display_name() {
        for kind in [TransformKind::Complement, TransformKind::Identity] {
            assert_eq!(TransformKind::from_str(&kind.to_string(), false), Ok(kind));
        }
        assert!(TransformKind::from_str("reverse", false).is_err());
    }

    #[test]
    fn closures_are_transforms() {
        let mut calls = 0;
        let mut packet = vec![1u8, 2, 3];
        {
            let mut add_one = |p: &mut [u8]| {
                calls += 1;
                p.iter_mut().for_each(|b| *b = b.wrapping_add(1));
            };
            add_one.apply(&mut packet);
        }
        assert_eq!(packet, vec![2, 3, 4]);
        assert_eq!(calls, 1);
    }
}
