use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    storage::{Heap, Storage},
    RingBuffer,
};

/// Serializes the items as a sequence, front to back.
impl<T: Serialize, S: Storage<T>> Serialize for RingBuffer<T, S> {
    fn serialize<Z: Serializer>(&self, serializer: Z) -> Result<Z::Ok, Z::Error> {
        serializer.collect_seq(self)
    }
}

/// Deserializes a sequence into a full ring buffer with exactly as many slots as items.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for RingBuffer<T, Heap> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use crate::{InlineRingBuffer, RingBuffer};

    #[test]
    fn test_serialize_logical_order() {
        let mut arr = RingBuffer::from([0, 1, 2]);
        arr.push_back(3);
        assert!(!arr.is_linearized());
        assert_eq!(serde_json::to_string(&arr).unwrap(), "[1,2,3]");

        let mut inline = InlineRingBuffer::<&str, 2>::inline();
        inline.extend(["a", "b", "c"]);
        assert_eq!(serde_json::to_string(&inline).unwrap(), r#"["b","c"]"#);
    }

    #[test]
    fn test_deserialize() {
        let arr: RingBuffer<u8> = serde_json::from_str("[4,5,6]").unwrap();
        assert_eq!(arr, [4, 5, 6]);
        assert_eq!(arr.capacity(), 3);
        assert!(arr.is_full());

        assert!(serde_json::from_str::<RingBuffer<u8>>("[256]").is_err());
    }
}
