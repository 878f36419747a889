// The developer's public links offered by `/dev`.
//
// Each link is one button. Button ids are namespaced per invocation
// (`<prefix>:<key>`) so clicks on an old `/dev` message never reach a newer
// collector.

/// One of the developer's public profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialLink {
    YouTube,
    DiscordServer,
    Instagram,
    GitHub,
}

impl SocialLink {
    /// Display order of the buttons.
    pub const ALL: [SocialLink; 4] = [
        SocialLink::YouTube,
        SocialLink::DiscordServer,
        SocialLink::Instagram,
        SocialLink::GitHub,
    ];

    /// Stable identifier used inside button ids.
    pub fn key(&self) -> &'static str {
        match self {
            SocialLink::YouTube => "youtube",
            SocialLink::DiscordServer => "discord_server",
            SocialLink::Instagram => "instagram",
            SocialLink::GitHub => "github",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SocialLink::YouTube => "YouTube",
            SocialLink::DiscordServer => "Servidor Discord",
            SocialLink::Instagram => "Instagram",
            SocialLink::GitHub => "Github",
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            SocialLink::YouTube => "https://www.youtube.com/@TinelliPlay",
            SocialLink::DiscordServer => "https://discord.gg/5Fqj64HFDV",
            SocialLink::Instagram => "https://www.instagram.com/vitortinelli",
            SocialLink::GitHub => "https://github.com/vitortinelli",
        }
    }

    /// Social networks get the primary style, code hosting the secondary one.
    pub fn is_primary(&self) -> bool {
        !matches!(self, SocialLink::GitHub)
    }

    /// Ephemeral text sent to whoever clicks the button.
    pub fn reply_message(&self) -> String {
        match self {
            SocialLink::YouTube => format!(
                "Aqui está o link do meu canal no YouTube: [YouTube]({})",
                self.url()
            ),
            SocialLink::DiscordServer => format!(
                "Aqui está o link do servidor do Discord do canal: [Discord]({})",
                self.url()
            ),
            SocialLink::Instagram => format!(
                "Aqui está o link do meu Instagram: [Instagram]({})",
                self.url()
            ),
            SocialLink::GitHub => format!(
                "Aqui está o link do meu GitHub: [GitHub]({})",
                self.url()
            ),
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|link| link.key() == key)
    }

    /// Button id for this link on the message identified by `prefix`.
    pub fn custom_id(&self, prefix: &str) -> String {
        format!("{}:{}", prefix, self.key())
    }

    /// Reverse of [`SocialLink::custom_id`]. Ids from other messages yield `None`.
    pub fn from_custom_id(prefix: &str, custom_id: &str) -> Option<Self> {
        let key = custom_id.strip_prefix(prefix)?.strip_prefix(':')?;
        Self::from_key(key)
    }
}
