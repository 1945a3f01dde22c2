use std::time::Instant;

#[derive(Debug)]
pub(crate) struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    /// `expires_at` of `None` means the entry never expires.
    pub(crate) fn new(value: V, expires_at: Option<Instant>) -> Self {
        Self { value, expires_at }
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn into_value(self) -> V {
        self.value
    }

    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }
}
