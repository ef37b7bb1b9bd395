use super::Contact;

/// Tracks which finger drives the pointer.
///
/// Keep the same finger until it lifts, then take the first one still down.
/// There is no distance or recency tie-break when switching.
#[derive(Debug, Default, Clone)]
pub struct PrimarySelector {
    primary: Option<u32>,
}

impl PrimarySelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, contacts: &[Contact]) -> Option<Contact> {
        if let Some(held) = self
            .primary
            .and_then(|id| contacts.iter().find(|c| c.id == id))
        {
            return Some(*held);
        }
        let first = *contacts.first()?;
        if self.primary != Some(first.id) {
            log::debug!("[touch] primary contact is now {}", first.id);
        }
        self.primary = Some(first.id);
        Some(first)
    }

    /// Identity of the finger currently driving the pointer, if any.
    pub fn current(&self) -> Option<u32> {
        self.primary
    }
}
