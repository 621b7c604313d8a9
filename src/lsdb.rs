// Link-state database: the latest advertisement from every known router

use std::collections::HashMap;

use log::info;

use crate::types::LsaPacket;

#[derive(Debug, Clone, PartialEq)]
pub struct LsdbEntry {
    pub sequence_number: i64,
    pub timestamp: f64,
    pub addresses: Vec<String>,
    pub links: HashMap<String, i32>,
}

impl LsdbEntry {
    /// Stands in for a router known only as someone else's link endpoint,
    /// until its own LSA arrives.
    fn placeholder() -> Self {
        Self {
            sequence_number: -1,
            timestamp: 0.0,
            addresses: Vec::new(),
            links: HashMap::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Lsdb {
    entries: HashMap<String, LsdbEntry>,
}

impl Lsdb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `packet` iff no entry exists for its originator or the stored
    /// sequence number is strictly smaller. Strict `<` makes re-flooding
    /// idempotent: a duplicate collapses to a no-op and flooding halts.
    pub fn update(&mut self, packet: &LsaPacket) -> bool {
        if let Some(entry) = self.entries.get(&packet.router_id) {
            if packet.sequence_number <= entry.sequence_number {
                return false;
            }
        }
        self.entries.insert(
            packet.router_id.clone(),
            LsdbEntry {
                sequence_number: packet.sequence_number,
                timestamp: packet.timestamp,
                addresses: packet.addresses.clone(),
                links: packet.links.clone(),
            },
        );
        for neighbor in packet.links.keys() {
            if !self.entries.contains_key(neighbor) {
                info!("[LSDB] discovered new router: {}", neighbor);
                self.entries
                    .insert(neighbor.clone(), LsdbEntry::placeholder());
            }
        }
        true
    }

    pub fn get(&self, router_id: &str) -> Option<&LsdbEntry> {
        self.entries.get(router_id)
    }

    pub fn addresses(&self, router_id: &str) -> &[String] {
        self.entries
            .get(router_id)
            .map(|entry| entry.addresses.as_slice())
            .unwrap_or(&[])
    }

    pub fn links(&self, router_id: &str) -> Option<&HashMap<String, i32>> {
        self.entries.get(router_id).map(|entry| &entry.links)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LsdbEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
