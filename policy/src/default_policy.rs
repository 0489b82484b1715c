/// Policy used when no policy file is configured.
///
/// Tainted commands are blocked. Every other command is logged, except when it
/// is reached through dynamically evaluated code (eval, assert, runtime-created
/// functions, `/e` regex callbacks) or a `call_user_func` shortly above the
/// spawn, which is blocked.
pub const DEFAULT_POLICY_YAML: &str = r#"
version: 1

webshell_command:
  action: block

command:
  action: log
  severity: 90
  stack:
    action: block
    frames:
      - file: "*eval()'d code*"
        message: "Command executed from eval()'d code - webshell or code execution vulnerability"
      - file: "*runtime-created function*"
        message: "Command executed from a runtime-created function"
      - file: "*assert code*"
        message: "Command executed from assert() code"
      - file: "*regexp code*"
        message: "Command executed from a regex replacement callback"
      - function: "call_user_func"
        max_depth: 4
        message: "Command executed through call_user_func"
"#;
