// ─── Internal helper: PluginMetadata builder ──────────────────────────────────
//
// Used exclusively by `define_plugin!`.  Not part of the public API.

/// Internal helper macro: builds a [`PluginMetadata`](crate::plugin::PluginMetadata)
/// from optional overrides.
///
/// # Internal calling convention
///
/// ```text
/// __plugin_metadata!(
///     @parse [$doc?]           ← captured doc literal
///            key: val, …       ← raw metadata tokens
/// )
/// ```
///
/// Unconsumed tokens are carried in a trailing `[ … ]` group:
///
/// ```text
/// __plugin_metadata!(@pm [$doc?] [$ver?] [$desc?] [$full_desc?] [key: val, …])
/// ```
#[macro_export]
#[doc(hidden)]
macro_rules! __plugin_metadata {
    // Entry: receives doc comment and raw metadata tokens
    (@parse [$($doc:expr)?] $($meta:tt)*) => {
        $crate::__plugin_metadata!(
            @pm [$($doc)?] [] [] [] [$($meta)*]
        )
    };

    // TT-muncher: skip leading comma
    (@pm $doc:tt $ver:tt $dsc:tt $mf:tt [, $($rest:tt)*]) => {
        $crate::__plugin_metadata!(@pm $doc $ver $dsc $mf [$($rest)*])
    };

    // version: "..."
    (@pm $doc:tt [$($old:expr)?] $dsc:tt $mf:tt [version : $v:literal $($rest:tt)*]) => {
        $crate::__plugin_metadata!(@pm $doc [$v] $dsc $mf [$($rest)*])
    };

    // desc: "..."
    (@pm $doc:tt $ver:tt [$($old:expr)?] $mf:tt [desc : $v:literal $($rest:tt)*]) => {
        $crate::__plugin_metadata!(@pm $doc $ver [$v] $mf [$($rest)*])
    };

    // full_desc: "..."
    (@pm $doc:tt $ver:tt $dsc:tt [$($old:expr)?] [full_desc : $v:literal $($rest:tt)*]) => {
        $crate::__plugin_metadata!(@pm $doc $ver $dsc [$v] [$($rest)*])
    };

    // End of tokens → emit
    (@pm [$($doc:expr)?] [$($ver:expr)?] [$($dsc:expr)?] [$($mf:expr)?] []) => {
        $crate::plugin::PluginMetadata {
            version:   $crate::__plugin_metadata!(@get_ver [$($ver)?]),
            desc:      $crate::__plugin_metadata!(@get_dsc [$($dsc)?]),
            full_desc: $crate::__plugin_metadata!(@get_fd [$($mf)?] [$($doc)?]),
        }
    };

    // @get_ver
    (@get_ver []) => { ::std::env!("CARGO_PKG_VERSION") };
    (@get_ver [$ver:expr]) => { $ver };

    // @get_dsc
    (@get_dsc []) => { ::std::env!("CARGO_PKG_DESCRIPTION") };
    (@get_dsc [$dsc:expr]) => { $dsc };

    // @get_fd: explicit > doc > None
    (@get_fd [$fd:expr] [$($_doc:expr)?]) => { ::std::option::Option::Some($fd) };
    (@get_fd [] [$doc:expr]) => { ::std::option::Option::Some($doc) };
    (@get_fd [] []) => { ::std::option::Option::None };
}

// ─── define_plugin! ──────────────────────────────────────────────────────────

/// Creates a [`PluginDescriptor`], the static, `Copy` handle to a plugin.
///
/// # Syntax
///
/// ```rust,ignore
/// use hookline::prelude::*;
///
/// pub static ADMIN: PluginDescriptor = define_plugin! {
///     /// Channel administration commands.
///     name: "admin",
///
///     callables: [
///         Callable::new(kick)
///             .commands(["kick"])
///             .require_chanmsg()
///             .require_privilege(OP),
///         Callable::new(title).url([r"https?://\S+"]),
///     ],
///
///     setup: admin_setup,  // fn(&dyn Bot) -> Result<(), BoxError>
///
///     metadata: {
///         version: "2.0.0",
///         desc:    "Short description.",
///     },
/// };
/// ```
///
/// ## Field reference
///
/// | Field | Required | Description |
/// |-------|----------|-------------|
/// | `name` | ✓ | Must be **first**. Plugin name. |
/// | `callables` |   | `[expr, …]`: `Callable`s or `Result<Callable, PatternError>`s |
/// | `setup` |   | `fn(&dyn Bot) -> Result<(), BoxError>` |
/// | `metadata` |   | `{ version, desc, full_desc }`; must be last |
///
/// [`PluginDescriptor`]: crate::plugin::PluginDescriptor
#[macro_export]
macro_rules! define_plugin {
    // ── Entry: with doc comment ───────────────────────────────────────────────
    //
    // Accumulator slots:
    //   [$n]         plugin name literal
    //   [$($c),*]    callable expressions
    //   [$($su)?]    setup path
    //   [$($doc)?]   doc literal
    ($(#[doc = $doc:literal])+ name: $name:literal, $($tail:tt)+) => {
        $crate::define_plugin!(
            @acc [$name] [] [] [::std::concat!($($doc, " "),*)]
            $($tail)+
        )
    };

    // ── Entry: no doc + more fields ───────────────────────────────────────────
    (name: $name:literal, $($tail:tt)+) => {
        $crate::define_plugin!(
            @acc [$name] [] [] []
            $($tail)+
        )
    };

    // ── Entry: name only ──────────────────────────────────────────────────────
    (name: $name:literal $(,)?) => {
        $crate::define_plugin!(
            @acc [$name] [] [] []
        )
    };

    // ── Accumulator: skip stray commas ────────────────────────────────────────
    (@acc $n:tt $c:tt $su:tt $doc:tt
        , $($rest:tt)*
    ) => {
        $crate::define_plugin!(
            @acc $n $c $su $doc
            $($rest)*
        )
    };

    // ── Consume callables: [expr, …] ──────────────────────────────────────────
    (
        @acc [$n:literal] [$($c:expr),*] [$($su:path)?] $doc:tt
        callables: [$($nc:expr),* $(,)?] $($rest:tt)*
    ) => {
        $crate::define_plugin!(
            @acc [$n] [$($c,)* $($nc),*] [$($su)?] $doc
            $($rest)*
        )
    };

    // ── Consume setup: path , <more fields> ───────────────────────────────────
    (
        @acc [$n:literal] [$($c:expr),*] [] $doc:tt
        setup: $su:path , $($rest:tt)+
    ) => {
        $crate::define_plugin!(
            @acc [$n] [$($c),*] [$su] $doc
            $($rest)+
        )
    };

    // ── Consume setup: path (last field) ──────────────────────────────────────
    (
        @acc [$n:literal] [$($c:expr),*] [] $doc:tt
        setup: $su:path $(,)?
    ) => {
        $crate::define_plugin!(
            @acc [$n] [$($c),*] [$su] $doc
        )
    };

    // ── Consume metadata: { … } ───────────────────────────────────────────────
    (
        @acc [$n:literal] [$($c:expr),*] [$($su:path)?] [$($doc:expr)?]
        metadata: { $($meta:tt)* } $(,)?
    ) => {
        $crate::define_plugin!(
            @terminal [$n] [$($c),*] [$($su)?] [$($doc)?] $($meta)*
        )
    };

    // ── No remaining fields → terminal ────────────────────────────────────────
    (
        @acc [$n:literal] [$($c:expr),*] [$($su:path)?] [$($doc:expr)?]
    ) => {
        $crate::define_plugin!(
            @terminal [$n] [$($c),*] [$($su)?] [$($doc)?]
        )
    };

    // ── @terminal: emit the PluginDescriptor ──────────────────────────────────
    (
        @terminal [$n:literal] [$($c:expr),*] [$($su:path)?] [$($doc:expr)?] $($meta:tt)*
    ) => {{
        const __HOOKLINE_META: $crate::plugin::PluginMetadata =
            $crate::__plugin_metadata!(@parse [$($doc)?] $($meta)*);

        fn __hookline_plugin_create()
            -> ::std::result::Result<$crate::plugin::Plugin, $crate::error::PatternError>
        {
            #[allow(unused_mut)]
            let mut __setup: ::std::option::Option<$crate::plugin::SetupFn> = None;
            $(
                __setup = Some($su as $crate::plugin::SetupFn);
            )?
            ::std::result::Result::Ok($crate::plugin::Plugin::__new(
                $n,
                ::std::vec![$( $crate::callable::IntoCallable::into_callable($c)? ),*],
                __setup,
                __HOOKLINE_META,
            ))
        }

        $crate::plugin::PluginDescriptor {
            api_version: $crate::plugin::HOOKLINE_PLUGIN_API_VERSION,
            name:        $n,
            create:      __hookline_plugin_create,
            metadata:    __HOOKLINE_META,
        }
    }};
}

#[cfg(test)]
mod tests {
    use crate::callable::Callable;
    use crate::handle::BotHandle;
    use crate::plugin::PluginDescriptor;
    use hookline_core::Bot;
    use tower::BoxError;

    async fn ping(bot: BotHandle) {
        bot.say("pong");
    }

    fn setup(_bot: &dyn Bot) -> Result<(), BoxError> {
        Err("not ready".into())
    }

    static DOCUMENTED: PluginDescriptor = define_plugin! {
        /// Answers pings.
        name: "ping",
        callables: [
            Callable::new(ping).commands(["ping"]),
            Callable::named("pong", ping).commands(["pong"]),
        ],
        setup: setup,
        metadata: {
            version: "9.9.9",
            desc: "Ping plugin",
        },
    };

    static BARE: PluginDescriptor = define_plugin! {
        name: "bare",
    };

    static BROKEN: PluginDescriptor = define_plugin! {
        name: "broken",
        callables: [Callable::new(ping).url(["(unclosed"])],
    };

    #[test]
    fn test_metadata_overrides() {
        let meta = DOCUMENTED.metadata();
        assert_eq!(meta.version, "9.9.9");
        assert_eq!(meta.desc, "Ping plugin");
        assert_eq!(meta.full_desc.map(str::trim), Some("Answers pings."));
    }

    #[test]
    fn test_metadata_defaults() {
        let meta = BARE.metadata();
        assert_eq!(meta.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(meta.full_desc, None);
        assert!(BARE.instantiate().unwrap().callables().is_empty());
    }

    #[test]
    fn test_callables_and_setup() {
        let plugin = DOCUMENTED.instantiate().unwrap();
        let names: Vec<_> = plugin.callables().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["ping", "pong"]);
        assert!(plugin.has_setup());
    }

    #[test]
    fn test_bad_url_fails_creation() {
        let err = BROKEN.instantiate().unwrap_err();
        assert_eq!(err.pattern, "(unclosed");
    }
}
