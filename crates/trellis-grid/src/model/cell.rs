//! Polymorphic cell content.
//!
//! A [`Cell`] is a tagged union over the content variants a grid cell can
//! hold: plain text, badge, tag, image, link/button, and progress. Variants
//! carry presentation attributes only; a cell's column affiliation is
//! positional (cell index == column index within its row) and it never holds
//! a pointer into the column or row.
//!
//! Change notification is an explicit observer registration: the owning row
//! installs a callback at attachment time, and every setter that actually
//! changes a value raises it with the attribute's symbolic name. A write
//! that leaves the stored value unchanged is a complete no-op, which is what
//! makes downstream incremental invalidation correct.

use std::sync::Arc;

use trellis_core::geometry::Color;

/// Symbolic attribute names carried by change notifications.
pub mod attr {
    pub const TEXT: &str = "text";
    pub const FORE: &str = "fore";
    pub const FILL: &str = "fill";
    pub const PREFIX: &str = "prefix";
    pub const SUFFIX: &str = "suffix";
    pub const IMAGE: &str = "image";
    pub const STATE: &str = "state";
    /// Raised instead of [`STATE`] when a badge enters `Processing`, so
    /// hosts can start the pulse animation for exactly that transition.
    pub const STATE_PROCESSING: &str = "state.processing";
    pub const TOOLTIP: &str = "tooltip";
    pub const TONE: &str = "tone";
    pub const ENABLED: &str = "enabled";
    pub const VALUE: &str = "value";
}

/// Whether a change to the named attribute can alter measured content width.
///
/// Width-affecting changes re-run width resolution before repaint; purely
/// chromatic changes repaint only.
pub fn attr_affects_width(attr: &str) -> bool {
    matches!(
        attr,
        attr::TEXT | attr::PREFIX | attr::SUFFIX | attr::IMAGE
    )
}

/// The change-notification callback installed by the owning row.
pub type ChangeHook = Arc<dyn Fn(&'static str) + Send + Sync>;

/// Holder for the optional change hook.
///
/// Cloning a cell intentionally drops the hook: a detached copy must not
/// notify the row the original belongs to.
#[derive(Default)]
pub(crate) struct HookSlot(Option<ChangeHook>);

impl HookSlot {
    fn notify(&self, attr: &'static str) {
        if let Some(hook) = &self.0 {
            hook(attr);
        }
    }

    fn set(&mut self, hook: ChangeHook) {
        self.0 = Some(hook);
    }

    fn clear(&mut self) {
        self.0 = None;
    }
}

impl Clone for HookSlot {
    fn clone(&self) -> Self {
        Self(None)
    }
}

impl PartialEq for HookSlot {
    fn eq(&self, _other: &Self) -> bool {
        // Hooks are wiring, not content.
        true
    }
}

impl std::fmt::Debug for HookSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.0.is_some() {
            "HookSlot(attached)"
        } else {
            "HookSlot(detached)"
        })
    }
}

/// Visual tone shared by tags and links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Default,
    Primary,
    Success,
    Warning,
    Error,
}

/// Badge display state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgeState {
    #[default]
    Default,
    /// Animated pulse; notifies under [`attr::STATE_PROCESSING`].
    Processing,
    Success,
    Warning,
    Error,
}

/// Plain text with optional prefix/suffix adornments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextCell {
    text: String,
    fore: Option<Color>,
    prefix_image: Option<String>,
    prefix_icon: Option<String>,
    suffix_image: Option<String>,
    suffix_icon: Option<String>,
    hook: HookSlot,
}

impl TextCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.text == text {
            return;
        }
        self.text = text;
        self.hook.notify(attr::TEXT);
    }

    pub fn fore(&self) -> Option<Color> {
        self.fore
    }

    pub fn set_fore(&mut self, fore: Option<Color>) {
        if self.fore == fore {
            return;
        }
        self.fore = fore;
        self.hook.notify(attr::FORE);
    }

    pub fn prefix_image(&self) -> Option<&str> {
        self.prefix_image.as_deref()
    }

    pub fn set_prefix_image(&mut self, image: Option<String>) {
        if self.prefix_image == image {
            return;
        }
        self.prefix_image = image;
        self.hook.notify(attr::PREFIX);
    }

    pub fn prefix_icon(&self) -> Option<&str> {
        self.prefix_icon.as_deref()
    }

    pub fn set_prefix_icon(&mut self, icon: Option<String>) {
        if self.prefix_icon == icon {
            return;
        }
        self.prefix_icon = icon;
        self.hook.notify(attr::PREFIX);
    }

    pub fn suffix_image(&self) -> Option<&str> {
        self.suffix_image.as_deref()
    }

    pub fn set_suffix_image(&mut self, image: Option<String>) {
        if self.suffix_image == image {
            return;
        }
        self.suffix_image = image;
        self.hook.notify(attr::SUFFIX);
    }

    pub fn suffix_icon(&self) -> Option<&str> {
        self.suffix_icon.as_deref()
    }

    pub fn set_suffix_icon(&mut self, icon: Option<String>) {
        if self.suffix_icon == icon {
            return;
        }
        self.suffix_icon = icon;
        self.hook.notify(attr::SUFFIX);
    }

    /// True iff either the prefix bitmap or the prefix icon is set.
    pub fn has_prefix(&self) -> bool {
        self.prefix_image.is_some() || self.prefix_icon.is_some()
    }

    /// True iff either the suffix bitmap or the suffix icon is set.
    pub fn has_suffix(&self) -> bool {
        self.suffix_image.is_some() || self.suffix_icon.is_some()
    }
}

/// A status badge: a dot or pill with short text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BadgeCell {
    text: String,
    state: BadgeState,
    fill: Option<Color>,
    hook: HookSlot,
}

impl BadgeCell {
    pub fn new(text: impl Into<String>, state: BadgeState) -> Self {
        Self {
            text: text.into(),
            state,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.text == text {
            return;
        }
        self.text = text;
        self.hook.notify(attr::TEXT);
    }

    pub fn state(&self) -> BadgeState {
        self.state
    }

    pub fn set_state(&mut self, state: BadgeState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.hook.notify(if state == BadgeState::Processing {
            attr::STATE_PROCESSING
        } else {
            attr::STATE
        });
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn set_fill(&mut self, fill: Option<Color>) {
        if self.fill == fill {
            return;
        }
        self.fill = fill;
        self.hook.notify(attr::FILL);
    }
}

/// A colored label chip.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TagCell {
    text: String,
    tone: Tone,
    fill: Option<Color>,
    hook: HookSlot,
}

impl TagCell {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.text == text {
            return;
        }
        self.text = text;
        self.hook.notify(attr::TEXT);
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn set_tone(&mut self, tone: Tone) {
        if self.tone == tone {
            return;
        }
        self.tone = tone;
        self.hook.notify(attr::TONE);
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn set_fill(&mut self, fill: Option<Color>) {
        if self.fill == fill {
            return;
        }
        self.fill = fill;
        self.hook.notify(attr::FILL);
    }
}

/// A bitmap reference. Has no text representation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageCell {
    image: String,
    tooltip: Option<String>,
    hook: HookSlot,
}

impl ImageCell {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Self::default()
        }
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn set_image(&mut self, image: impl Into<String>) {
        let image = image.into();
        if self.image == image {
            return;
        }
        self.image = image;
        self.hook.notify(attr::IMAGE);
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn set_tooltip(&mut self, tooltip: Option<String>) {
        if self.tooltip == tooltip {
            return;
        }
        self.tooltip = tooltip;
        self.hook.notify(attr::TOOLTIP);
    }
}

/// A clickable link, or a button when `button` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkCell {
    /// Host-side identifier reported on activation.
    id: String,
    text: String,
    enabled: bool,
    tone: Tone,
    image: Option<String>,
    /// Render as a filled button instead of an inline link.
    button: bool,
    fill: Option<Color>,
    hook: HookSlot,
}

impl LinkCell {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            enabled: true,
            tone: Tone::default(),
            image: None,
            button: false,
            fill: None,
            hook: HookSlot::default(),
        }
    }

    /// Create a button-styled link.
    pub fn button(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            button: true,
            ..Self::new(id, text)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.text == text {
            return;
        }
        self.text = text;
        self.hook.notify(attr::TEXT);
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        self.hook.notify(attr::ENABLED);
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn set_tone(&mut self, tone: Tone) {
        if self.tone == tone {
            return;
        }
        self.tone = tone;
        self.hook.notify(attr::TONE);
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn set_image(&mut self, image: Option<String>) {
        if self.image == image {
            return;
        }
        self.image = image;
        self.hook.notify(attr::IMAGE);
    }

    pub fn is_button(&self) -> bool {
        self.button
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn set_fill(&mut self, fill: Option<Color>) {
        if self.fill == fill {
            return;
        }
        self.fill = fill;
        self.hook.notify(attr::FILL);
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// A progress bar over a value clamped to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressCell {
    value: f32,
    fill: Option<Color>,
    hook: HookSlot,
}

impl ProgressCell {
    pub fn new(value: f32) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Set the progress value, clamping to `[0, 1]`.
    ///
    /// A write whose clamped value equals the stored value is a no-op.
    pub fn set_value(&mut self, value: f32) {
        let value = value.clamp(0.0, 1.0);
        if self.value == value {
            return;
        }
        self.value = value;
        self.hook.notify(attr::VALUE);
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn set_fill(&mut self, fill: Option<Color>) {
        if self.fill == fill {
            return;
        }
        self.fill = fill;
        self.hook.notify(attr::FILL);
    }

    /// The percentage string used for display and clipboard copy.
    pub fn percent_text(&self) -> String {
        format!("{}%", (self.value * 100.0).round() as i32)
    }
}

/// One cell's content, polymorphic over the presentation variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(TextCell),
    Badge(BadgeCell),
    Tag(TagCell),
    Image(ImageCell),
    Link(LinkCell),
    Progress(ProgressCell),
}

impl Default for Cell {
    fn default() -> Self {
        Self::Text(TextCell::default())
    }
}

impl Cell {
    /// An empty text cell, used where a record lacks a column's field.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The variant-specific string representation used for clipboard copy.
    ///
    /// Images have none; progress renders as an integer percentage.
    pub fn display_text(&self) -> Option<String> {
        match self {
            Self::Text(c) => Some(c.text().to_string()),
            Self::Badge(c) => Some(c.text().to_string()),
            Self::Tag(c) => Some(c.text().to_string()),
            Self::Link(c) => Some(c.text().to_string()),
            Self::Progress(c) => Some(c.percent_text()),
            Self::Image(_) => None,
        }
    }

    /// True iff a prefix bitmap or icon is set.
    pub fn has_prefix(&self) -> bool {
        match self {
            Self::Text(c) => c.has_prefix(),
            _ => false,
        }
    }

    /// True iff a suffix bitmap or icon is set.
    pub fn has_suffix(&self) -> bool {
        match self {
            Self::Text(c) => c.has_suffix(),
            _ => false,
        }
    }

    /// True iff the cell carries a bitmap or icon reference.
    pub fn has_image(&self) -> bool {
        match self {
            Self::Image(_) => true,
            Self::Link(c) => c.has_image(),
            Self::Text(c) => c.has_prefix() || c.has_suffix(),
            _ => false,
        }
    }

    /// Install the owning row's change hook.
    pub(crate) fn set_hook(&mut self, hook: ChangeHook) {
        match self {
            Self::Text(c) => c.hook.set(hook),
            Self::Badge(c) => c.hook.set(hook),
            Self::Tag(c) => c.hook.set(hook),
            Self::Image(c) => c.hook.set(hook),
            Self::Link(c) => c.hook.set(hook),
            Self::Progress(c) => c.hook.set(hook),
        }
    }

    /// Remove any installed change hook.
    pub(crate) fn clear_hook(&mut self) {
        match self {
            Self::Text(c) => c.hook.clear(),
            Self::Badge(c) => c.hook.clear(),
            Self::Tag(c) => c.hook.clear(),
            Self::Image(c) => c.hook.clear(),
            Self::Link(c) => c.hook.clear(),
            Self::Progress(c) => c.hook.clear(),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::Text(TextCell::new(text))
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self::Text(TextCell::new(text))
    }
}

impl From<TextCell> for Cell {
    fn from(cell: TextCell) -> Self {
        Self::Text(cell)
    }
}

impl From<BadgeCell> for Cell {
    fn from(cell: BadgeCell) -> Self {
        Self::Badge(cell)
    }
}

impl From<TagCell> for Cell {
    fn from(cell: TagCell) -> Self {
        Self::Tag(cell)
    }
}

impl From<ImageCell> for Cell {
    fn from(cell: ImageCell) -> Self {
        Self::Image(cell)
    }
}

impl From<LinkCell> for Cell {
    fn from(cell: LinkCell) -> Self {
        Self::Link(cell)
    }
}

impl From<ProgressCell> for Cell {
    fn from(cell: ProgressCell) -> Self {
        Self::Progress(cell)
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    fn recording_hook() -> (ChangeHook, Arc<Mutex<Vec<&'static str>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let hook: ChangeHook = Arc::new(move |attr| log_clone.lock().push(attr));
        (hook, log)
    }

    #[test]
    fn test_text_setter_notifies_once() {
        let (hook, log) = recording_hook();
        let mut cell = TextCell::new("a");
        cell.hook.set(hook);

        cell.set_text("b");
        cell.set_text("b"); // no-op
        cell.set_fore(Some(Color::rgb(1, 2, 3)));

        assert_eq!(*log.lock(), vec![attr::TEXT, attr::FORE]);
        assert_eq!(cell.text(), "b");
    }

    #[test]
    fn test_progress_clamps_and_noop_writes() {
        let (hook, log) = recording_hook();
        let mut cell = ProgressCell::new(0.5);
        cell.hook.set(hook);

        cell.set_value(-0.3);
        assert_eq!(cell.value(), 0.0);
        cell.set_value(1.7);
        assert_eq!(cell.value(), 1.0);
        assert_eq!(log.lock().len(), 2);

        // Clamped to the stored value: no notification.
        cell.set_value(2.5);
        assert_eq!(cell.value(), 1.0);
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn test_progress_percent_text() {
        assert_eq!(ProgressCell::new(0.0).percent_text(), "0%");
        assert_eq!(ProgressCell::new(0.425).percent_text(), "42%");
        assert_eq!(ProgressCell::new(1.0).percent_text(), "100%");
    }

    #[test]
    fn test_badge_processing_distinct_attr() {
        let (hook, log) = recording_hook();
        let mut cell = BadgeCell::new("sync", BadgeState::Default);
        cell.hook.set(hook);

        cell.set_state(BadgeState::Processing);
        cell.set_state(BadgeState::Success);

        assert_eq!(*log.lock(), vec![attr::STATE_PROCESSING, attr::STATE]);
    }

    #[test]
    fn test_tooltip_notifies_without_width_change() {
        let (hook, log) = recording_hook();
        let mut cell = ImageCell::new("pic.png");
        cell.hook.set(hook);

        cell.set_tooltip(Some("preview".into()));
        cell.set_tooltip(Some("preview".into())); // no-op

        assert_eq!(*log.lock(), vec![attr::TOOLTIP]);
        assert!(!attr_affects_width(attr::TOOLTIP));
    }

    #[test]
    fn test_display_text_per_variant() {
        assert_eq!(Cell::from("hi").display_text().as_deref(), Some("hi"));
        assert_eq!(
            Cell::from(ProgressCell::new(0.3)).display_text().as_deref(),
            Some("30%")
        );
        assert_eq!(Cell::from(ImageCell::new("pic.png")).display_text(), None);
        assert_eq!(
            Cell::from(LinkCell::button("del", "Delete"))
                .display_text()
                .as_deref(),
            Some("Delete")
        );
    }

    #[test]
    fn test_derived_indicators() {
        let mut text = TextCell::new("x");
        assert!(!text.has_prefix());
        text.set_prefix_icon(Some("star".into()));
        assert!(text.has_prefix());
        assert!(Cell::from(text).has_image());

        let mut link = LinkCell::new("open", "Open");
        assert!(!link.has_image());
        link.set_image(Some("icon.png".into()));
        assert!(link.has_image());
    }

    #[test]
    fn test_clone_drops_hook() {
        let (hook, log) = recording_hook();
        let mut cell = TextCell::new("a");
        cell.hook.set(hook);

        let mut copy = cell.clone();
        copy.set_text("changed");

        assert!(log.lock().is_empty());
    }
}
