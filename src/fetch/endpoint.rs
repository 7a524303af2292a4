use crate::config::ReleaseChannel;

/// Expands `{nightly}`, `{channel}` and `{provider}` in an endpoint template.
pub fn render_endpoint(template: &str, channel: ReleaseChannel, provider: &str) -> String {
    template
        .replace("{nightly}", if channel.is_nightly() { "true" } else { "false" })
        .replace("{channel}", channel.as_str())
        .replace("{provider}", &urlencoding::encode(provider))
}
