//! A greeting plugin.
//!
//! Every command carries its own examples; `cargo test -p hookline-greeter`
//! runs them through the example harness.

use std::sync::atomic::{AtomicUsize, Ordering};

use hookline::prelude::*;
use hookline::runtime::tracing::{debug, info};

static GREETINGS: AtomicUsize = AtomicUsize::new(0);

async fn greet(bot: BotHandle) -> String {
    GREETINGS.fetch_add(1, Ordering::Relaxed);
    format!("Hello, {}!", bot.trigger().nick())
}

async fn echo(trigger: Arc<Trigger>) -> Option<String> {
    trigger.group(2).map(str::to_string)
}

async fn greeted(bot: BotHandle) -> Outcome {
    let count = GREETINGS.load(Ordering::Relaxed);
    bot.say("[debug] reading greeting counter");
    bot.say(&format!("Greeted {count} time(s)."));
    Outcome::NoLimit
}

async fn reset(bot: BotHandle) {
    GREETINGS.store(0, Ordering::Relaxed);
    info!(by = %bot.trigger().nick(), "Greeting counter reset");
    bot.reply("Counter reset.");
}

async fn topic(bot: BotHandle) {
    match bot.trigger().group(2) {
        Some(text) => bot.say(&format!("Topic for {} is now: {text}", bot.trigger().sender())),
        None => bot.reply("Give me a topic."),
    }
}

async fn version() -> String {
    format!("hookline-greeter {}", env!("CARGO_PKG_VERSION"))
}

async fn issue(bot: BotHandle, url: UrlMatch) {
    let (Some(owner), Some(repo), Some(number)) = (url.group(1), url.group(2), url.group(3))
    else {
        return;
    };
    bot.say(&format!("[{owner}/{repo}] issue #{number}"));
}

fn setup(bot: &dyn Bot) -> Result<(), BoxError> {
    GREETINGS.store(0, Ordering::Relaxed);
    debug!(nick = bot.nick(), "Greeter ready");
    Ok(())
}

pub static GREETER: PluginDescriptor = define_plugin! {
    /// Greets people and keeps count.
    name: "greeter",

    callables: [
        Callable::new(greet)
            .commands(["greet", "hello"])
            .nickname_commands(["hi"])
            .priority(Priority::High)
            .rate(RateLimit::per_user(10))
            .example(Example::new(".greet").result("Hello, Tester!").user_help())
            .example(Example::new("$nickname: hi").result("Hello, Tester!"))
            .example(Example::new(".hello").result("Hello, Tester!").repeat(3).privmsg()),
        Callable::new(echo)
            .commands(["echo"])
            .example(Example::new(".echo hi there").result("hi there"))
            .example(Example::new(".echo something").user_help()),
        Callable::new(greeted)
            .commands(["greeted"])
            .example(
                Example::new(".greeted")
                    .result("Greeted 0 time(s).")
                    .ignore(r"\[debug\] .*"),
            ),
        Callable::new(reset)
            .commands(["reset"])
            .require_owner_with(Notice::reply("Only the bot owner can do that."))
            .example(Example::new(".reset").result("Counter reset.").owner())
            .example(Example::new(".reset").result("Only the bot owner can do that.")),
        Callable::new(topic)
            .commands(["topic"])
            .require_chanmsg_with(Notice::reply("This command only works in channels."))
            .require_privilege_with(OP, Notice::say("You must be a channel operator."))
            .example(Example::new(".topic Rust 2024").result("You must be a channel operator."))
            .example(
                Example::new(".topic Rust 2024")
                    .result("This command only works in channels.")
                    .privmsg(),
            ),
        Callable::new(version)
            .commands(["version"])
            .example(Example::new(".version").result(r"hookline-greeter \d+\.\d+\.\d+").regex()),
        Callable::new(issue)
            .url([r"https?://github\.com/([\w.-]+)/([\w.-]+)/issues/(\d+)"]),
    ],

    setup: setup,
};
