/// Extract the calibrator name from one line of a calibrator query log.
///
/// Query logs are pipe-delimited tables. After stripping spaces a line is an
/// accepted calibrator when it has more than two fields, the second field
/// starts with `[`, and the second-to-last field (the rejection reason) is
/// empty. The name is the text between that `[` and the next `]`.
///
/// Example accepted line: `| [J1256-0547] 3C279 | 1.2 | 0.9 |  |`
pub fn parse_calibrator_line(line: &str) -> Option<String> {
    let compact: String = line.chars().filter(|c| *c != ' ').collect();
    let fields: Vec<&str> = compact.split('|').collect();
    if fields.len() <= 2 {
        return None;
    }

    let calibrator = fields[1];
    let reason = fields[fields.len() - 2];
    let rest = calibrator.strip_prefix('[')?;
    if !reason.is_empty() {
        return None;
    }

    let name = rest.split(']').next().unwrap_or_default();
    Some(name.replace('[', ""))
}

/// All accepted calibrators of a query log, in file order.
pub fn parse_calibrator_log(text: &str) -> Vec<String> {
    text.lines().filter_map(parse_calibrator_line).collect()
}
