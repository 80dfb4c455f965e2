//! Built-in commands every user understands, bound into a per-user context.

use std::rc::Weak;

use tracing::{info, warn};
use txtad_core::expression::Operator;
use txtad_core::scan::closing_bracket;
use txtad_core::{Context, EngineResult, ExpressionResult, Handler, Interpreter, Scope};

use crate::config::GameConfig;
use crate::user::{CtxField, Recipient, Request, UserState, split_ctx_path};

type Command = fn(&UserState, &Scope<'_>, &str, &str);

const COMMANDS: [(&str, &str, Command); 14] = [
    ("H_ATTS01", "#sa (.*)", set_attribute),
    ("H_CTX01", "#ctx remove (.*)", remove_context),
    ("H_CTX02", "#ctx add (.*)", add_context),
    ("H_CTX03", "#ctx replace (.*)", replace_context),
    ("H_CTX04", "#ctx name (.*)", rename_context),
    ("H_LST01", "#lst atts (.*)", list_attributes),
    ("H_LST02", "#lst* atts (.*)", list_all_attributes),
    ("H_LST03", "#lst ctxs (.*)", list_linked_contexts),
    ("H_PRINT01", "#> (.*)", print),
    ("H_PRINT02", "#-> (.*)", print_to),
    ("H_PRINT03", "#>> (.*)", print_marked),
    ("H_RESET01", "#reset game", reset_game),
    ("H_RESET02", "#reset user", reset_user),
    ("H_USER01", "#remove_user( .*)?", remove_user),
];

/// Attribute operators of `#sa`, tried in this order.
const ASSIGNMENTS: [&str; 7] = ["+=", "-=", "++", "--", "*=", "/=", "="];

/// The mechanics context of one user. Handlers hold the user weakly.
pub(crate) fn context(user: &Weak<UserState>, config: &GameConfig) -> EngineResult<Context> {
    let mut ctx = Context::new(config.mechanics_context_id.as_str(), config.mechanics_priority)
        .with_name("mechanics")
        .with_shared(false);
    for (id, pattern, command) in COMMANDS {
        ctx.add_listener(Handler::new(id, pattern, bind(user, command))?);
    }
    Ok(ctx)
}

fn bind(user: &Weak<UserState>, command: Command) -> impl Fn(&Scope<'_>, &str, &str) + 'static {
    let user = Weak::clone(user);
    move |scope: &Scope<'_>, event: &str, args: &str| match user.upgrade() {
        Some(user) => command(&user, scope, event, args),
        None => warn!(event, "user gone, command dropped"),
    }
}

fn set_attribute(user: &UserState, scope: &Scope<'_>, _event: &str, args: &str) {
    let Some((op, pos)) = ASSIGNMENTS
        .iter()
        .find_map(|op| args.find(op).map(|pos| (*op, pos)))
    else {
        warn!(user = user.id(), args, "no assignment operator");
        return;
    };
    let target = args[..pos].trim();
    let expression = &args[pos + op.len()..];
    let Some((ctx_id, key)) = target.rsplit_once('.') else {
        warn!(user = user.id(), target, "invalid attribute id");
        return;
    };
    let Some(ctx) = user.context(ctx_id) else {
        warn!(user = user.id(), context = ctx_id, "context not found");
        return;
    };
    let Some(current) = ctx.borrow().get_attribute(key).map(str::to_string) else {
        warn!(user = user.id(), context = ctx_id, attribute = key, "attribute not found");
        return;
    };
    let value = match assign(op, &current, expression, scope.interpreter()) {
        Ok(value) => value,
        Err(err) => {
            warn!(user = user.id(), args, %err, "attribute not set");
            return;
        }
    };
    info!(user = user.id(), context = ctx_id, attribute = key, %value, "attribute set");
    ctx.borrow_mut().update_attribute(key, value);
}

fn assign(
    op: &str,
    current: &str,
    expression: &str,
    interpreter: &Interpreter<'_>,
) -> ExpressionResult<String> {
    let arithmetic = match op {
        "=" => return interpreter.evaluate(expression),
        "++" => return Operator::Add.apply(current, "1"),
        "--" => return Operator::Sub.apply(current, "1"),
        "+=" => Operator::Add,
        "-=" => Operator::Sub,
        "*=" => Operator::Mul,
        _ => Operator::Div,
    };
    arithmetic.apply(current, &interpreter.evaluate(expression)?)
}

fn remove_context(user: &UserState, _: &Scope<'_>, _: &str, ctx_id: &str) {
    info!(user = user.id(), context = ctx_id, "removing context");
    user.unlink(ctx_id);
}

fn add_context(user: &UserState, _: &Scope<'_>, _: &str, ctx_id: &str) {
    info!(user = user.id(), context = ctx_id, "adding context");
    user.link(ctx_id);
}

fn replace_context(user: &UserState, _: &Scope<'_>, _: &str, args: &str) {
    match args.rsplit_once(" -> ") {
        Some((old, new)) => {
            user.unlink(old);
            user.link(new);
        }
        None => warn!(user = user.id(), args, "expected `old -> new`"),
    }
}

fn rename_context(user: &UserState, _: &Scope<'_>, _: &str, args: &str) {
    let Some((ctx_id, name)) = args.rsplit_once(" = ") else {
        warn!(user = user.id(), args, "expected `context = name`");
        return;
    };
    match user.context(ctx_id) {
        Some(ctx) => ctx.borrow_mut().set_name(name),
        None => warn!(user = user.id(), context = ctx_id, "context not found"),
    }
}

fn list(user: &UserState, ctx_id: &str, with_hidden: bool) {
    let Some(ctx) = user.context(ctx_id) else {
        warn!(user = user.id(), context = ctx_id, "context not found");
        return;
    };
    user.send(Recipient::Me, "Attributes:");
    let ctx = ctx.borrow();
    let (hidden, visible): (Vec<_>, Vec<_>) =
        ctx.attributes().iter().partition(|(key, _)| key.starts_with('_'));
    for (key, value) in visible {
        user.send(Recipient::Me, format!("- {key}: {value}"));
    }
    if with_hidden {
        for (key, value) in hidden {
            user.send(Recipient::Me, format!("- {key}: {value}"));
        }
    }
}

fn list_attributes(user: &UserState, _: &Scope<'_>, _: &str, ctx_id: &str) {
    list(user, ctx_id, false);
}

fn list_all_attributes(user: &UserState, _: &Scope<'_>, _: &str, ctx_id: &str) {
    list(user, ctx_id, true);
}

/// `ctx->*category->what` or `ctx->*category.attr`: one line per linked
/// context.
fn list_linked_contexts(user: &UserState, _: &Scope<'_>, _: &str, args: &str) {
    let Some((ctx_id, CtxField::Variable, what)) = split_ctx_path(args) else {
        warn!(user = user.id(), args, "expected `context->*category->field`");
        return;
    };
    let Some((category, field, linked_what)) = split_ctx_path(what) else {
        warn!(user = user.id(), args, "expected `context->*category->field`");
        return;
    };
    let Some(ctx) = user.context(ctx_id) else {
        warn!(user = user.id(), context = ctx_id, "context not found");
        return;
    };
    let category = category.strip_prefix('*').unwrap_or(category);
    if category.is_empty() {
        user.send(Recipient::Me, "linked contexts:");
    } else {
        user.send(Recipient::Me, format!("{category}:"));
    }
    let linked = user.linked(&ctx.borrow(), category);
    for linked in linked {
        let linked = linked.borrow();
        let mut line = String::new();
        match field {
            CtxField::Variable => user.describe(&linked, linked_what, &mut line),
            CtxField::Attribute => {
                line.push_str(linked.get_attribute(linked_what).unwrap_or_default());
            }
        }
        user.send(Recipient::Me, format!("- {line}"));
    }
}

fn print(user: &UserState, _: &Scope<'_>, event: &str, args: &str) {
    let txt = user.render(event, args);
    user.send(Recipient::Me, txt);
}

/// Like `#>`, with a `$ ` mark in front of the line.
fn print_marked(user: &UserState, _: &Scope<'_>, event: &str, args: &str) {
    let txt = user.render(event, args);
    user.send(Recipient::Me, format!("$ {txt}"));
}

/// `#-> *text` prints to everyone, `#-> {lookup}text` to the user id the
/// lookup yields.
fn print_to(user: &UserState, scope: &Scope<'_>, event: &str, args: &str) {
    if let Some(rest) = args.strip_prefix('*') {
        let txt = user.render(event, rest);
        user.send(Recipient::All, txt);
    } else if args.starts_with('{') {
        let Some(close) = closing_bracket(args, 1, b'{', b'}') else {
            warn!(user = user.id(), args, "unclosed recipient placeholder");
            return;
        };
        let placeholder = &args[1..close];
        let recipient = scope.interpreter().substitute(&format!("{{{placeholder}}}"));
        if recipient.starts_with('{') {
            warn!(user = user.id(), placeholder, "recipient not resolved");
            return;
        }
        let txt = user.render(event, &args[close + 1..]);
        user.send(Recipient::User(recipient), txt);
    } else {
        warn!(user = user.id(), args, "expected `*` or `{{recipient}}`");
    }
}

fn reset_game(user: &UserState, _: &Scope<'_>, _: &str, _: &str) {
    user.request(Request::ResetGame);
}

fn reset_user(user: &UserState, _: &Scope<'_>, _: &str, _: &str) {
    user.request(Request::ResetUser);
}

fn remove_user(user: &UserState, _: &Scope<'_>, _: &str, _: &str) {
    user.request(Request::RemoveUser);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::content::{Content, ContextSpec, ListenerSpec, UseCtxSpec};
    use crate::user::{Outgoing, User};

    fn spec(name: &str, priority: i32, attributes: &[(&str, &str)]) -> ContextSpec {
        ContextSpec {
            name: name.into(),
            description: format!("The {name}."),
            re_entrycondition: String::new(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            priority,
            permeable: true,
            shared: false,
            listeners: Vec::new(),
        }
    }

    fn exit(id: &str, target: &str) -> ListenerSpec {
        ListenerSpec {
            id: id.into(),
            re_event: "go (.*)".into(),
            arguments: "#ctx replace <_> -> <ctx>".into(),
            permeable: true,
            logic: String::new(),
            ctx: Some(target.into()),
            use_ctx_regex: UseCtxSpec::Name,
        }
    }

    fn user() -> User {
        let mut hall = spec("hall", 10, &[]);
        hall.listeners = vec![exit("L1", "rooms/yard"), exit("L2", "items/key")];
        let content = Content::new(Settings {
            initial_events: String::new(),
            initial_contexts: vec!["rooms/hall".into(), "player".into()],
        })
        .with_context("rooms/hall", hall)
        .with_context("rooms/yard", spec("yard", 10, &[("exits", "1")]))
        .with_context("items/key", spec("key", 10, &[]))
        .with_context(
            "player",
            spec("Player", 5, &[("hp", "10"), ("gold", "3"), ("_seen", "0")]),
        );
        let objects = content.build().unwrap();
        User::new("u1", &objects, &content.settings, &GameConfig::default()).unwrap()
    }

    fn run(user: &User, event: &str) -> Vec<String> {
        user.handle_event(event, 16).unwrap();
        user.take_outbox().into_iter().map(|out| out.body).collect()
    }

    fn hp(user: &User) -> String {
        user.context("player")
            .and_then(|ctx| ctx.borrow().get_attribute("hp").map(str::to_string))
            .unwrap_or_default()
    }

    #[test]
    fn set_attribute_operators() {
        let user = user();
        run(&user, "#sa player.hp += 5");
        assert_eq!(hp(&user), "15");
        run(&user, "#sa player.hp -= {player.gold}");
        assert_eq!(hp(&user), "12");
        run(&user, "#sa player.hp++");
        assert_eq!(hp(&user), "13");
        run(&user, "#sa player.hp--");
        assert_eq!(hp(&user), "12");
        run(&user, "#sa player.hp *= 2");
        assert_eq!(hp(&user), "24");
        run(&user, "#sa player.hp /= 5");
        assert_eq!(hp(&user), "4");
        run(&user, "#sa player.hp = 2*(3+4)");
        assert_eq!(hp(&user), "14");
    }

    #[test]
    fn set_attribute_never_creates() {
        let user = user();
        run(&user, "#sa player.mana = 3");
        let player = user.context("player").unwrap();
        assert!(!player.borrow().has_attribute("mana"));
    }

    #[test]
    fn failed_expression_keeps_value() {
        let user = user();
        run(&user, "#sa player.hp /= 0");
        run(&user, "#sa player.hp += lots");
        assert_eq!(hp(&user), "10");
    }

    #[test]
    fn context_commands() {
        let user = user();
        run(&user, "#ctx remove rooms/hall;#ctx add rooms/yard");
        assert_eq!(user.stack().order(), vec!["rooms/yard", "player", "ctx_mechanic"]);
        run(&user, "#ctx replace rooms/yard -> rooms/hall");
        assert_eq!(user.stack().order(), vec!["rooms/hall", "player", "ctx_mechanic"]);
        run(&user, "#ctx name *rooms = Great Hall");
        assert_eq!(user.context("rooms/hall").unwrap().borrow().name(), "Great Hall");
    }

    #[test]
    fn linked_context_forwarder_moves_the_user() {
        let user = user();
        run(&user, "go yard");
        assert_eq!(user.stack().order(), vec!["rooms/yard", "player", "ctx_mechanic"]);
        run(&user, "go key");
        assert_eq!(user.stack().order(), vec!["rooms/yard", "player", "ctx_mechanic"]);
    }

    #[test]
    fn list_commands() {
        let user = user();
        assert_eq!(
            run(&user, "#lst atts player"),
            vec!["Attributes:", "- gold: 3", "- hp: 10"]
        );
        assert_eq!(
            run(&user, "#lst* atts player"),
            vec!["Attributes:", "- gold: 3", "- hp: 10", "- _seen: 0"]
        );
        assert_eq!(
            run(&user, "#lst ctxs rooms/hall->*rooms->name"),
            vec!["rooms:", "- yard"]
        );
        assert_eq!(
            run(&user, "#lst ctxs rooms/hall->*->name"),
            vec!["linked contexts:", "- yard", "- key"]
        );
        assert_eq!(
            run(&user, "#lst ctxs rooms/hall->*rooms.exits"),
            vec!["rooms:", "- 1"]
        );
    }

    #[test]
    fn print_commands() {
        let user = user();
        assert_eq!(run(&user, "#> You have {player.hp} hp."), vec!["You have 10 hp."]);
        assert_eq!(run(&user, "#>> {player->name} waits."), vec!["$ Player waits."]);
        user.handle_event("#-> *Hello all;#-> {player->name}Psst", 16)
            .unwrap();
        assert_eq!(
            user.take_outbox(),
            vec![
                Outgoing {
                    to: Recipient::All,
                    body: "Hello all".into()
                },
                Outgoing {
                    to: Recipient::User("Player".into()),
                    body: "Psst".into()
                },
            ]
        );
    }

    #[test]
    fn game_requests_are_recorded() {
        let user = user();
        run(&user, "#reset user;#reset game;#remove_user");
        assert_eq!(
            user.take_requests(),
            vec![Request::ResetUser, Request::ResetGame, Request::RemoveUser]
        );
        assert!(user.take_requests().is_empty());

        run(&user, "#remove_user u1");
        assert_eq!(user.take_requests(), vec![Request::RemoveUser]);
    }
}
