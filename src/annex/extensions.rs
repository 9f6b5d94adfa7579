//! Negotiated protocol extensions

/// Extension that lets the remote send `INFO` messages
pub const INFO: &str = "INFO";

/// Extension that lets the remote ask for its git remote name
pub const GETGITREMOTENAME: &str = "GETGITREMOTENAME";

/// Extensions announced by the host with `EXTENSIONS`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    names: Vec<String>,
}

impl Extensions {
    /// An empty set; nothing has been announced yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set with a fresh announcement
    pub fn announce<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
    }

    /// Whether the host announced `name`
    pub fn is_announced(&self, name: &str) -> bool {
        self.names.iter().any(|announced| announced == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl<S: Into<String>> FromIterator<S> for Extensions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut extensions = Extensions::new();
        extensions.announce(iter);
        extensions
    }
}
