/// One `interface` block of a running configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceBlock<'a> {
    /// Everything after `interface `, e.g. `GigabitEthernet1/0/1`.
    pub name: &'a str,
    /// 1-based line number of the header.
    pub line: usize,
    /// Indented child lines, trimmed, with their line numbers.
    pub children: Vec<(usize, &'a str)>,
}

impl<'a> InterfaceBlock<'a> {
    /// Arguments of every child line starting with `keyword`, in order.
    pub fn directives<'b>(
        &'b self,
        keyword: &'b str,
    ) -> impl Iterator<Item = (usize, &'a str)> + 'b {
        self.children
            .iter()
            .filter_map(move |&(line, text)| strip_keyword(text, keyword).map(|rest| (line, rest)))
    }
}

/// Strip a multi-word keyword from the front of a line, matching whole words
/// and ignoring repeated whitespace. Returns the remaining arguments.
pub(crate) fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let mut rest = line.trim_start();
    for word in keyword.split_whitespace() {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if !rest[..end].eq_ignore_ascii_case(word) {
            return None;
        }
        rest = rest[end..].trim_start();
    }
    Some(rest.trim_end())
}

enum State<'a> {
    Outside,
    Inside(InterfaceBlock<'a>),
}

/// Split configuration text into `interface` blocks.
///
/// A block opens on an unindented `interface <name>` line and collects the
/// indented lines that follow. Any other unindented line (`!`, `end`, a
/// global command, a CLI prompt) closes it. Blank lines are ignored.
pub fn interface_blocks(text: &str) -> Vec<InterfaceBlock<'_>> {
    let mut blocks = Vec::new();
    let mut state = State::Outside;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let indented = line.starts_with(char::is_whitespace);
        state = match (state, indented) {
            (State::Inside(mut block), true) => {
                block.children.push((line_no, line.trim()));
                State::Inside(block)
            }
            (State::Outside, true) => State::Outside,
            (previous, false) => {
                if let State::Inside(block) = previous {
                    blocks.push(block);
                }
                match strip_keyword(line, "interface") {
                    Some(name) if !name.is_empty() => State::Inside(InterfaceBlock {
                        name,
                        line: line_no,
                        children: Vec::new(),
                    }),
                    _ => State::Outside,
                }
            }
        };
    }

    if let State::Inside(block) = state {
        blocks.push(block);
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "\
hostname access-1
!
interface Vlan10
 description Data
 ip address 10.0.1.1 255.255.255.0
!
interface GigabitEthernet1/0/1
 description Desk1
 switchport access vlan 10

interface GigabitEthernet1/0/2
 shutdown
end
";

    #[test]
    fn test_segments_blocks_with_line_numbers() {
        let blocks = interface_blocks(CONFIG);
        assert_eq!(blocks.len(), 3);

        assert_eq!(blocks[0].name, "Vlan10");
        assert_eq!(blocks[0].line, 3);
        assert_eq!(
            blocks[0].children,
            vec![(4, "description Data"), (5, "ip address 10.0.1.1 255.255.255.0")]
        );

        // A blank line does not close a block
        assert_eq!(blocks[1].name, "GigabitEthernet1/0/1");
        assert_eq!(blocks[1].children.len(), 2);

        // `end` closes the last block
        assert_eq!(blocks[2].children, vec![(12, "shutdown")]);
    }

    #[test]
    fn test_indented_lines_outside_blocks_are_ignored() {
        let text = "router ospf 1\n network 10.0.0.0 0.0.0.255 area 0\ninterface Vlan1\n no ip address\n";
        let blocks = interface_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].children, vec![(4, "no ip address")]);
    }

    #[test]
    fn test_back_to_back_headers_and_crlf() {
        let text = "interface Gi1/0/1\r\ninterface Gi1/0/2\r\n shutdown\r\n";
        let blocks = interface_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].children.is_empty());
        assert_eq!(blocks[1].children, vec![(3, "shutdown")]);
    }

    #[test]
    fn test_duplicate_headers_yield_separate_blocks() {
        let text = "interface Vlan10\n description A\ninterface Vlan10\n description B\n";
        let blocks = interface_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name, blocks[1].name);
    }

    #[test]
    fn test_strip_keyword_matches_whole_words() {
        assert_eq!(
            strip_keyword("switchport  access vlan 10", "switchport access vlan"),
            Some("10")
        );
        assert_eq!(strip_keyword("switchport accessx vlan 10", "switchport access vlan"), None);
        assert_eq!(strip_keyword("shutdown", "shutdown"), Some(""));
        assert_eq!(strip_keyword("no shutdown", "shutdown"), None);
        assert_eq!(strip_keyword("Description  Uplink  ", "description"), Some("Uplink"));
    }

    #[test]
    fn test_directives_iterates_in_order() {
        let blocks = interface_blocks(
            "interface Gi1/0/1\n switchport trunk allowed vlan 10\n switchport trunk allowed vlan add 20\n",
        );
        let allowed: Vec<_> = blocks[0]
            .directives("switchport trunk allowed vlan")
            .collect();
        assert_eq!(allowed, vec![(2, "10"), (3, "add 20")]);
    }
}
