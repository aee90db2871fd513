use slotmap::new_key_type;

new_key_type! {
    /// Identifies an entity (vessel) in the world. Doubles as the resource
    /// pool scope for every device the entity carries.
    pub struct EntityId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn entity_ids_are_distinct_and_hashable() {
        use std::collections::HashMap;
        let mut sm = SlotMap::<EntityId, ()>::with_key();
        let a = sm.insert(());
        let b = sm.insert(());
        assert_ne!(a, b);

        let mut map = HashMap::new();
        map.insert(a, "station");
        map.insert(b, "lander");
        assert_eq!(map[&a], "station");
    }
}
