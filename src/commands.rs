//! Available commands and autocomplete logic

use crate::domain::Role;
use crate::router::Route;

/// What a command does once resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
  Navigate(Route),
  Logout,
  Quit,
}

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  pub action: CommandAction,
  /// Roles allowed to run it; empty means everyone
  pub roles: &'static [Role],
}

impl Command {
  pub fn allowed_for(&self, role: Option<Role>) -> bool {
    match (self.action, role) {
      (CommandAction::Quit, _) => true,
      (_, None) => false,
      (_, Some(role)) => self.roles.is_empty() || self.roles.contains(&role),
    }
  }
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "consultations",
    aliases: &["c", "consult"],
    description: "Consultation requests",
    action: CommandAction::Navigate(Route::Consultations),
    roles: &[Role::Farmer, Role::Consultant],
  },
  Command {
    name: "reports",
    aliases: &["r", "report"],
    description: "Consultation reports",
    action: CommandAction::Navigate(Route::Reports),
    roles: &[Role::Farmer, Role::Consultant],
  },
  Command {
    name: "visits",
    aliases: &["v", "visit", "farm-visits"],
    description: "Scheduled farm visits",
    action: CommandAction::Navigate(Route::FarmVisits),
    roles: &[Role::Farmer, Role::Consultant],
  },
  Command {
    name: "feedback",
    aliases: &["f", "ratings"],
    description: "Consultation feedback",
    action: CommandAction::Navigate(Route::Feedback),
    roles: &[Role::Farmer, Role::Consultant],
  },
  Command {
    name: "consultants",
    aliases: &["experts", "directory"],
    description: "Browse consultants",
    action: CommandAction::Navigate(Route::Consultants),
    roles: &[Role::Farmer],
  },
  Command {
    name: "profile",
    aliases: &["p", "me"],
    description: "Your profile",
    action: CommandAction::Navigate(Route::Profile),
    roles: &[],
  },
  Command {
    name: "admin",
    aliases: &["a", "users"],
    description: "Manage accounts",
    action: CommandAction::Navigate(Route::Admin),
    roles: &[Role::Admin],
  },
  Command {
    name: "logout",
    aliases: &["signout"],
    description: "Sign out",
    action: CommandAction::Logout,
    roles: &[],
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit agrilink",
    action: CommandAction::Quit,
    roles: &[],
  },
];

/// Look up a command by exact name
pub fn find(name: &str) -> Option<&'static Command> {
  COMMANDS.iter().find(|c| c.name == name)
}

/// Get autocomplete suggestions for a given input, limited to what the role may run
pub fn get_suggestions(input: &str, role: Option<Role>) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();
  let available = COMMANDS.iter().filter(|c| c.allowed_for(role));

  if input_lower.is_empty() {
    return available.collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in available {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    // Fuzzy match on alias
    if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((cmd, 5));
    }
  }

  // Stable sort keeps table order within a priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_role_commands() {
    let farmer = get_suggestions("", Some(Role::Farmer));
    assert!(farmer.iter().any(|c| c.name == "consultants"));
    assert!(!farmer.iter().any(|c| c.name == "admin"));

    let admin = get_suggestions("", Some(Role::Admin));
    assert!(admin.iter().any(|c| c.name == "admin"));
    assert!(!admin.iter().any(|c| c.name == "consultations"));
  }

  #[test]
  fn test_signed_out_can_only_quit() {
    let suggestions = get_suggestions("", None);
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].action, CommandAction::Quit);
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("reports", Some(Role::Consultant));
    assert_eq!(suggestions[0].name, "reports");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("v", Some(Role::Farmer));
    assert_eq!(suggestions[0].name, "visits");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("consultan", Some(Role::Farmer));
    assert_eq!(suggestions[0].name, "consultants");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("out", Some(Role::Consultant));
    assert_eq!(suggestions[0].name, "logout");
  }

  #[test]
  fn test_find_by_name() {
    assert_eq!(
      find("visits").map(|c| c.action),
      Some(CommandAction::Navigate(Route::FarmVisits))
    );
    assert!(find("dashboard").is_none());
  }
}
