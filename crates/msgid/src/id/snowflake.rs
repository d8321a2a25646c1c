/// Declares a 64-bit Snowflake ID type with a custom bit layout.
///
/// Fields are packed from the most significant bit downward:
///
/// ```text
///  +--------------+---------------+-------------+--------------+
///  | reserved (R) | timestamp (T) | node ID (N) | sequence (S) |
///  +--------------+---------------+-------------+--------------+
///  |<------ MSB --------- 64 bits ----------- LSB ------------>|
/// ```
///
/// The layout must reserve at least the sign bit and the four widths must add
/// up to 64. Both are checked at compile time. Keeping the sign bit clear means
/// IDs order identically as `u64` and `i64`, and lets the lock-free generator
/// use `u64::MAX` as its "nothing issued yet" marker.
///
/// ## Example
///
/// ```
/// msgid::define_snowflake_id!(
///     /// 39-bit timestamp, 8-bit node, 16-bit sequence.
///     WideSequenceId,
///     reserved: 1,
///     timestamp: 39,
///     node_id: 8,
///     sequence: 16
/// );
///
/// use msgid::SnowflakeId;
/// assert_eq!(WideSequenceId::max_node_id(), 255);
/// assert_eq!(WideSequenceId::max_sequence(), 65_535);
/// ```
#[macro_export]
macro_rules! define_snowflake_id {
    (
        $(#[$meta:meta])*
        $name:ident,
        reserved: $reserved_bits:expr,
        timestamp: $timestamp_bits:expr,
        node_id: $node_id_bits:expr,
        sequence: $sequence_bits:expr
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            id: u64,
        }

        const _: () = {
            assert!(
                $reserved_bits + $timestamp_bits + $node_id_bits + $sequence_bits == u64::BITS,
                "Snowflake layout must cover exactly 64 bits"
            );
            assert!($reserved_bits >= 1, "Snowflake layout must reserve the sign bit");
        };

        impl $name {
            pub const RESERVED_BITS: u64 = $reserved_bits;
            pub const TIMESTAMP_BITS: u64 = $timestamp_bits;
            pub const NODE_ID_BITS: u64 = $node_id_bits;
            pub const SEQUENCE_BITS: u64 = $sequence_bits;

            pub const SEQUENCE_SHIFT: u64 = 0;
            pub const NODE_ID_SHIFT: u64 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;
            pub const TIMESTAMP_SHIFT: u64 = Self::NODE_ID_SHIFT + Self::NODE_ID_BITS;

            pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;
            pub const NODE_ID_MASK: u64 = (1 << Self::NODE_ID_BITS) - 1;
            pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

            pub const fn from(timestamp: u64, node_id: u64, sequence: u64) -> Self {
                let t = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
                let n = (node_id & Self::NODE_ID_MASK) << Self::NODE_ID_SHIFT;
                let s = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
                Self { id: t | n | s }
            }

            /// Extracts the timestamp from the packed ID.
            pub const fn timestamp(&self) -> u64 {
                (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
            }

            /// Extracts the node ID from the packed ID.
            pub const fn node_id(&self) -> u64 {
                (self.id >> Self::NODE_ID_SHIFT) & Self::NODE_ID_MASK
            }

            /// Extracts the sequence number from the packed ID.
            pub const fn sequence(&self) -> u64 {
                (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
            }

            /// Returns the raw integer value.
            pub const fn to_raw(&self) -> u64 {
                self.id
            }

            /// Returns the value as an `i64`. Lossless because the sign bit is
            /// reserved.
            pub const fn to_i64(&self) -> i64 {
                self.id as i64
            }
        }

        impl $crate::SnowflakeId for $name {
            fn timestamp(&self) -> u64 {
                self.timestamp()
            }

            fn max_timestamp() -> u64 {
                Self::TIMESTAMP_MASK
            }

            fn node_id(&self) -> u64 {
                self.node_id()
            }

            fn max_node_id() -> u64 {
                Self::NODE_ID_MASK
            }

            fn sequence(&self) -> u64 {
                self.sequence()
            }

            fn max_sequence() -> u64 {
                Self::SEQUENCE_MASK
            }

            fn from_components(timestamp: u64, node_id: u64, sequence: u64) -> Self {
                debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
                debug_assert!(node_id <= Self::NODE_ID_MASK, "node_id overflow");
                debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
                Self::from(timestamp, node_id, sequence)
            }

            fn to_raw(&self) -> u64 {
                self.id
            }

            fn from_raw(raw: u64) -> Self {
                Self { id: raw }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.id)
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let full = core::any::type_name::<Self>();
                let name = full.rsplit("::").next().unwrap_or(full);
                f.debug_struct(name)
                    .field("id", &format_args!("{} (0x{:x})", self.id, self.id))
                    .field("timestamp", &self.timestamp())
                    .field("node_id", &self.node_id())
                    .field("sequence", &self.sequence())
                    .finish()
            }
        }

        impl core::str::FromStr for $name {
            type Err = $crate::Error;

            /// Parses the base-10 form produced by `Display`.
            fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
                // u64 rejects a sign, i64 rejects anything with the sign bit set.
                let raw = s
                    .parse::<u64>()
                    .and_then(|_| s.parse::<i64>())
                    .map_err($crate::Error::InvalidId)?;
                Ok(Self { id: raw as u64 })
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.id
            }
        }
    };
}

define_snowflake_id!(
    /// A 64-bit message ID using the Twitter layout
    ///
    /// - 1 bit reserved (sign bit, always zero)
    /// - 41 bits timestamp (ms since the clock's epoch, ~69 years)
    /// - 10 bits node ID
    /// - 12 bits sequence
    ///
    /// ```text
    ///  Bit Index:  63           63 62            22 21          12 11             0
    ///              +--------------+----------------+--------------+---------------+
    ///  Field:      | reserved (1) | timestamp (41) | node ID (10) | sequence (12) |
    ///              +--------------+----------------+--------------+---------------+
    ///              |<----------- MSB ---------- 64 bits ---------- LSB ----------->|
    /// ```
    MessageId,
    reserved: 1,
    timestamp: 41,
    node_id: 10,
    sequence: 12
);

#[cfg(feature = "serde")]
impl serde::Serialize for MessageId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.to_raw())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for MessageId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <u64 as serde::Deserialize>::deserialize(deserializer)?;
        if raw > i64::MAX as u64 {
            return Err(serde::de::Error::custom("reserved bit set"));
        }
        Ok(<Self as crate::SnowflakeId>::from_raw(raw))
    }
}
