use typed_builder::TypedBuilder;

/// Machine construction options.
///
/// ```
/// use cycleboy_core::EmulatorConfig;
///
/// let config = EmulatorConfig::builder().profile(true).build();
/// assert!(config.boot_rom.is_none());
/// ```
#[derive(Clone, Debug, Default, TypedBuilder)]
pub struct EmulatorConfig {
    /// 256-byte DMG boot ROM. When absent the machine starts directly in the
    /// post-boot state at PC=0x0100.
    #[builder(default, setter(strip_option))]
    pub boot_rom: Option<Vec<u8>>,
    /// Attach a `Profiler` to the machine.
    #[builder(default = false)]
    pub profile: bool,
}
