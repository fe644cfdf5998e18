use serde::Serialize;

/// Positional key for the `index`-th field of a record (0-based index,
/// 1-based label).
pub fn channel_key(index: usize) -> String {
    format!("Sensor {}", index + 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub key: String,
    pub display_name: String,
}

/// Ordered set of discovered channel keys with user-editable display names.
///
/// The key set is established by the first accepted sample of a session and
/// is not retracted afterwards: later records with fewer fields leave the
/// set intact (those samples simply omit the missing indices), and later
/// records with more fields do not widen it. `clear` empties the registry so
/// the next sample re-establishes it.
#[derive(Debug, Default, Clone)]
pub struct ChannelRegistry {
    channels: Vec<Channel>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the channel-key set from the first observed field count.
    /// A no-op once the set exists.
    pub fn register_first(&mut self, field_count: usize) {
        if !self.channels.is_empty() {
            return;
        }
        self.channels = (0..field_count)
            .map(|i| {
                let key = channel_key(i);
                Channel {
                    display_name: key.clone(),
                    key,
                }
            })
            .collect();
    }

    /// Updates the display name for `key`. No uniqueness validation;
    /// last-writer-wins. Returns false if the key is not registered.
    pub fn rename(&mut self, key: &str, display_name: &str) -> bool {
        match self.channels.iter_mut().find(|c| c.key == key) {
            Some(channel) => {
                channel.display_name = display_name.to_owned();
                true
            }
            None => false,
        }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn display_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.display_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }
}
