//! Command palette entries and autocomplete

use crate::session::Role;

/// Where a command takes the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  Home,
  Attendance,
  Holidays,
  Notices,
  Leave,
  Fees,
  Complaints,
  Rate,
  Profile,
  Search,
  SwitchStudent,
  Logout,
  Quit,
}

/// Who may run a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
  Everyone,
  Parents,
  Admins,
}

impl Audience {
  pub fn allows(self, role: Role) -> bool {
    match self {
      Audience::Everyone => true,
      Audience::Parents => role == Role::Parent,
      Audience::Admins => role == Role::Admin,
    }
  }
}

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  pub route: Route,
  pub audience: Audience,
}

pub const COMMANDS: &[Command] = &[
  Command {
    name: "home",
    aliases: &["menu", "dashboard"],
    description: "Back to the main menu",
    route: Route::Home,
    audience: Audience::Everyone,
  },
  Command {
    name: "attendance",
    aliases: &["a", "att", "calendar"],
    description: "Monthly attendance calendar",
    route: Route::Attendance,
    audience: Audience::Parents,
  },
  Command {
    name: "holidays",
    aliases: &["h", "holiday"],
    description: "School holiday list",
    route: Route::Holidays,
    audience: Audience::Everyone,
  },
  Command {
    name: "notices",
    aliases: &["n", "notice", "news"],
    description: "Notice board",
    route: Route::Notices,
    audience: Audience::Parents,
  },
  Command {
    name: "leave",
    aliases: &["l", "apply"],
    description: "Apply for leave",
    route: Route::Leave,
    audience: Audience::Parents,
  },
  Command {
    name: "fees",
    aliases: &["f", "fee"],
    description: "Fee status",
    route: Route::Fees,
    audience: Audience::Parents,
  },
  Command {
    name: "complaints",
    aliases: &["c", "complaint"],
    description: "Send a complaint to the school",
    route: Route::Complaints,
    audience: Audience::Parents,
  },
  Command {
    name: "rate",
    aliases: &["r", "review", "feedback"],
    description: "Rate the school",
    route: Route::Rate,
    audience: Audience::Parents,
  },
  Command {
    name: "profile",
    aliases: &["p", "me"],
    description: "Student profile",
    route: Route::Profile,
    audience: Audience::Parents,
  },
  Command {
    name: "search",
    aliases: &["s", "find", "students"],
    description: "Search students",
    route: Route::Search,
    audience: Audience::Admins,
  },
  Command {
    name: "switch",
    aliases: &["child", "next"],
    description: "Switch to another linked student",
    route: Route::SwitchStudent,
    audience: Audience::Parents,
  },
  Command {
    name: "logout",
    aliases: &["signout"],
    description: "Log out and forget this device",
    route: Route::Logout,
    audience: Audience::Everyone,
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit the portal",
    route: Route::Quit,
    audience: Audience::Everyone,
  },
];

/// Autocomplete suggestions for the given role, best match first.
pub fn get_suggestions(input: &str, role: Role) -> Vec<&'static Command> {
  let input_lower = input.trim().to_lowercase();
  let available = COMMANDS.iter().filter(|c| c.audience.allows(role));

  if input_lower.is_empty() {
    return available.collect();
  }

  let mut matches: Vec<(&Command, u32)> = available
    .filter_map(|cmd| match_rank(cmd, &input_lower).map(|rank| (cmd, rank)))
    .collect();

  matches.sort_by_key(|(_, rank)| *rank);
  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

fn match_rank(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    Some(0)
  } else if cmd.aliases.contains(&input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if cmd.aliases.iter().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_role_commands() {
    let parent = get_suggestions("", Role::Parent);
    let admin = get_suggestions("", Role::Admin);
    assert!(parent.iter().any(|c| c.route == Route::Attendance));
    assert!(!parent.iter().any(|c| c.route == Route::Search));
    assert!(admin.iter().any(|c| c.route == Route::Search));
    assert!(!admin.iter().any(|c| c.route == Route::Fees));
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("notices", Role::Parent);
    assert_eq!(suggestions[0].name, "notices");
  }

  #[test]
  fn test_alias_match() {
    assert_eq!(get_suggestions("a", Role::Parent)[0].name, "attendance");
    assert_eq!(get_suggestions("q", Role::Admin)[0].name, "quit");
  }

  #[test]
  fn test_prefix_match() {
    assert_eq!(get_suggestions("hol", Role::Parent)[0].name, "holidays");
  }

  #[test]
  fn test_fuzzy_match() {
    assert_eq!(get_suggestions("plain", Role::Parent)[0].name, "complaints");
  }

  #[test]
  fn test_role_filters_matches() {
    assert!(get_suggestions("search", Role::Parent)
      .iter()
      .all(|c| c.route != Route::Search));
    assert_eq!(get_suggestions("search", Role::Admin)[0].route, Route::Search);
    assert!(get_suggestions("zzz", Role::Admin).is_empty());
  }
}
