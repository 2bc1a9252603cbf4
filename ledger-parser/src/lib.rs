use std::collections::BTreeMap;
use std::str::FromStr;

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser as PestParser;
use rust_decimal::Decimal;

use ledger_core as lc;

use error::{ParseError, ParseResult};

pub mod error;

#[derive(PestParser)]
#[grammar = "ledger.pest"]
pub struct JournalParser;

#[derive(Debug, Default)]
struct ParseState {
    aliases: BTreeMap<String, String>,
}

impl ParseState {
    fn add_alias(&mut self, pair: Pair<'_, Rule>) -> ParseResult<()> {
        debug_assert!(pair.as_rule() == Rule::alias);
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let name = inner
            .next()
            .ok_or_else(|| ParseError::invalid_state_with_span("alias name", span.clone()))?
            .as_str()
            .trim();
        let target = inner
            .next()
            .ok_or_else(|| ParseError::invalid_state_with_span("aliased account", span.clone()))?
            .as_str()
            .trim();
        if name.is_empty() || target.is_empty() {
            return Err(ParseError::invalid_input_with_span(
                "alias needs both a name and an account",
                span,
            ));
        }
        self.aliases.insert(name.to_string(), target.to_string());
        Ok(())
    }

    /// Expands an alias matching the whole account or its first segment.
    fn dealias(&self, account: &str) -> Option<String> {
        if let Some(target) = self.aliases.get(account) {
            return Some(target.clone());
        }
        let (head, tail) = account.split_at(account.find(':')?);
        self.aliases
            .get(head)
            .map(|target| format!("{}{}", target, tail))
    }
}

/// Byte offsets at which each `'\n'`-separated line starts.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        LineIndex { starts }
    }

    /// 0-indexed line containing `offset`.
    fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset) - 1
    }
}

/// Parses a ledger journal into its transactions, recording for each one the lines it spans.
///
/// Line numbers are 0-indexed and agree with splitting `input` on `'\n'`.
pub fn parse(input: &str) -> ParseResult<lc::TransactionCache> {
    let parsed = JournalParser::parse(Rule::file, input)?
        .next()
        .ok_or_else(|| ParseError::invalid_state("non-empty parse result"))?;

    let stamp = lc::SourceStamp::of(input);
    let lines = LineIndex::new(input);
    let mut state = ParseState::default();
    let mut transactions = Vec::new();

    for pair in parsed.into_inner() {
        match pair.as_rule() {
            Rule::EOI => break,
            Rule::alias => state.add_alias(pair)?,
            Rule::transaction => {
                transactions.push(transaction(pair, &state, &lines, stamp)?);
            }
            rule => {
                return Err(ParseError::invalid_state_with_span(
                    format!("transaction or alias, found {:?}", rule),
                    pair.as_span(),
                ))
            }
        }
    }

    Ok(lc::TransactionCache::new(transactions, state.aliases, stamp))
}

fn transaction(
    pair: Pair<'_, Rule>,
    state: &ParseState,
    lines: &LineIndex,
    stamp: lc::SourceStamp,
) -> ParseResult<lc::Transaction> {
    debug_assert!(pair.as_rule() == Rule::transaction);
    let span = pair.as_span();
    let first_line = lines.line_of(span.start());
    let mut inner = pair.into_inner();

    let header = inner
        .next()
        .ok_or_else(|| ParseError::invalid_state_with_span("transaction header", span.clone()))?;
    let mut tx = header_fields(header)?;

    let mut last_line = first_line;
    let mut elided = None;
    for p in inner {
        last_line = lines.line_of(p.as_span().start());
        match p.as_rule() {
            Rule::posting => {
                let p_span = p.as_span();
                let (line, has_amount) = posting(p, state)?;
                if !has_amount {
                    if elided.is_some() {
                        return Err(ParseError::invalid_input_with_span(
                            "only one posting per transaction may omit its amount",
                            p_span,
                        ));
                    }
                    elided = Some(tx.expenselines.len());
                }
                tx.expenselines.push(line);
            }
            Rule::note => {}
            rule => {
                return Err(ParseError::invalid_state_with_span(
                    format!("posting or note, found {:?}", rule),
                    p.as_span(),
                ))
            }
        }
    }

    if let Some(index) = elided {
        let total: Decimal = tx
            .expenselines
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, line)| line.amount)
            .sum();
        tx.expenselines[index].amount = if total.is_zero() {
            Decimal::ZERO
        } else {
            -total
        };
    }

    tx.block = lc::Block::new(first_line, last_line, Some(stamp));
    Ok(tx)
}

fn header_fields(pair: Pair<'_, Rule>) -> ParseResult<lc::Transaction> {
    debug_assert!(pair.as_rule() == Rule::header);
    let span = pair.as_span();
    let mut date = None;
    let mut payee = None;
    let mut status = None;
    let mut check = None;
    let mut comment = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::date => date = Some(p.as_str().to_string()),
            // The auxiliary (effective) date is accepted but not tracked.
            Rule::aux_date => {}
            Rule::status => status = lc::Status::from_marker(p.as_str()),
            Rule::check => check = Some(check_number(p)?),
            Rule::payee => payee = Some(p.as_str().to_string()),
            Rule::comment => comment = Some(comment_text(p)),
            rule => {
                return Err(ParseError::invalid_state_with_span(
                    format!("header field, found {:?}", rule),
                    p.as_span(),
                ))
            }
        }
    }

    let date = date.ok_or_else(|| ParseError::invalid_state_with_span("date", span.clone()))?;
    let payee = payee.ok_or_else(|| ParseError::invalid_state_with_span("payee", span))?;
    Ok(lc::Transaction::builder()
        .date(date)
        .payee(payee)
        .expenselines(Vec::new())
        .status(status)
        .check(check)
        .comment(comment)
        .build())
}

fn check_number(pair: Pair<'_, Rule>) -> ParseResult<u32> {
    let span = pair.as_span();
    let code = pair
        .into_inner()
        .next()
        .ok_or_else(|| ParseError::invalid_state_with_span("check digits", span.clone()))?;
    code.as_str().parse().map_err(|_| {
        ParseError::invalid_input_with_span(
            format!("check number {} is too large", code.as_str()),
            span,
        )
    })
}

/// Returns the expense line and whether its amount was written out.
fn posting(pair: Pair<'_, Rule>, state: &ParseState) -> ParseResult<(lc::ExpenseLine, bool)> {
    debug_assert!(pair.as_rule() == Rule::posting);
    let span = pair.as_span();
    let mut status = None;
    let mut account = None;
    let mut amount = None;
    let mut comment = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::status => status = lc::Status::from_marker(p.as_str()),
            Rule::account => account = Some(p.as_str().to_string()),
            Rule::amount => amount = Some(amount_value(p)?),
            Rule::comment => comment = Some(comment_text(p)),
            rule => {
                return Err(ParseError::invalid_state_with_span(
                    format!("posting field, found {:?}", rule),
                    p.as_span(),
                ))
            }
        }
    }

    let account = account.ok_or_else(|| ParseError::invalid_state_with_span("account", span))?;
    let dealiased_account = state.dealias(&account);
    let has_amount = amount.is_some();
    let (num, currency) = amount.unwrap_or((Decimal::ZERO, None));
    let line = lc::ExpenseLine::builder()
        .account(account)
        .amount(num)
        .currency(currency)
        .comment(comment)
        .status(status)
        .dealiased_account(dealiased_account)
        .build();
    Ok((line, has_amount))
}

fn amount_value(pair: Pair<'_, Rule>) -> ParseResult<(Decimal, Option<String>)> {
    debug_assert!(pair.as_rule() == Rule::amount);
    let span = pair.as_span();
    let mut negate = false;
    let mut value = None;
    let mut currency = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::minus => negate = true,
            Rule::commodity => currency = Some(p.as_str().to_string()),
            Rule::quantity => value = Some(num(p)?),
            rule => {
                return Err(ParseError::invalid_state_with_span(
                    format!("amount part, found {:?}", rule),
                    p.as_span(),
                ))
            }
        }
    }

    let value = value.ok_or_else(|| ParseError::invalid_state_with_span("number", span))?;
    Ok((if negate { -value } else { value }, currency))
}

fn num(pair: Pair<'_, Rule>) -> ParseResult<Decimal> {
    let s = pair.as_str().replace(',', "");
    Decimal::from_str(s.trim_end_matches('.'))
        .map_err(|e| ParseError::decimal_parse_error(e, pair.as_span()))
}

fn comment_text(pair: Pair<'_, Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use indoc::indoc;
    use pest::Parser;

    macro_rules! parse_ok {
        ( $rule:ident, $input:expr ) => {
            assert_eq!(
                JournalParser::parse(Rule::$rule, $input)
                    .unwrap()
                    .as_str(),
                $input
            );
        };
        ( $rule:ident, $input:expr, $output:expr ) => {
            assert_eq!(
                JournalParser::parse(Rule::$rule, $input)
                    .unwrap()
                    .as_str(),
                $output
            );
        };
    }

    macro_rules! parse_fail {
        ( $rule:ident, $input:expr ) => {
            assert!(JournalParser::parse(Rule::$rule, $input).is_err());
        };
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn date() {
        parse_ok!(date, "2024-01-01");
        parse_ok!(date, "2024/1/5");
        parse_ok!(date, "2024.12.31");

        parse_fail!(date, "24-01-01");
        parse_fail!(date, "2024 01 01");
        parse_fail!(date, "January 1");
    }

    #[test]
    fn account() {
        parse_ok!(account, "Assets:Checking");
        parse_ok!(account, "Assets:Bank Account");
        parse_ok!(account, "Expenses:Food:Groceries");
        parse_ok!(account, "Assets:Checking    $-42.50", "Assets:Checking");
        parse_ok!(account, "Assets:Checking\t$-42.50", "Assets:Checking");
        parse_ok!(account, "Expenses:Food ; lunch", "Expenses:Food");

        parse_fail!(account, " Assets");
        parse_fail!(account, "; Assets");
    }

    #[test]
    fn amount() {
        parse_ok!(amount, "$42.50");
        parse_ok!(amount, "$-42.50");
        parse_ok!(amount, "-$42.50");
        parse_ok!(amount, "42.50 USD");
        parse_ok!(amount, "€ 1,000.00");
        parse_ok!(amount, "1,234,567");
        parse_ok!(amount, "$3.10  ; coffee", "$3.10");

        parse_fail!(amount, "$");
        parse_fail!(amount, "abc");
        parse_fail!(amount, "; 12");
    }

    #[test]
    fn payee() {
        parse_ok!(payee, "Store");
        parse_ok!(payee, "Corner Store");
        parse_ok!(payee, "Corner Store ; weekly", "Corner Store");
        parse_ok!(payee, "Store   ", "Store");
    }

    #[test]
    fn posting_line() {
        parse_ok!(posting, "    Checking    $-42.50");
        parse_ok!(posting, "    Groceries");
        parse_ok!(posting, "\t* Expenses:Food\t$5 ; lunch");
        parse_ok!(posting, "    Groceries\n", "    Groceries");

        parse_fail!(posting, "Checking    $-42.50");
        parse_fail!(posting, "    ; just a note");
    }

    #[test]
    fn simple_transaction() {
        let source = indoc! {"
            2024-01-01 Store
                Checking    $-42.50
                Groceries
        "};
        let cache = parse(source).unwrap();
        assert_eq!(cache.len(), 1);
        let tx = &cache.transactions[0];
        assert_eq!(tx.date, "2024-01-01");
        assert_eq!(tx.payee, "Store");
        assert_eq!(tx.block.first_line, 0);
        assert_eq!(tx.block.last_line, 2);
        assert_eq!(tx.block.stamp, Some(lc::SourceStamp::of(source)));
        assert_eq!(
            tx.expenselines,
            vec![
                lc::ExpenseLine::builder()
                    .account("Checking".into())
                    .amount(dec("-42.50"))
                    .currency(Some("$".into()))
                    .build(),
                lc::ExpenseLine::builder()
                    .account("Groceries".into())
                    .amount(dec("42.50"))
                    .build(),
            ]
        );
    }

    #[test]
    fn header_fields_and_notes() {
        let source = indoc! {"
            2024-01-02=2024-01-04 * (1042) Corner Cafe ; coffee
                ; paid by card
                ! Checking    $-3.10 ; pending
                Expenses:Dining    $3.10
        "};
        let cache = parse(source).unwrap();
        let tx = &cache.transactions[0];
        assert_eq!(tx.date, "2024-01-02");
        assert_eq!(tx.payee, "Corner Cafe");
        assert_eq!(tx.status, Some(lc::Status::Cleared));
        assert_eq!(tx.check, Some(1042));
        assert_eq!(tx.comment.as_deref(), Some("coffee"));
        assert_eq!((tx.block.first_line, tx.block.last_line), (0, 3));
        assert_eq!(tx.expenselines.len(), 2);
        assert_eq!(tx.expenselines[0].status, Some(lc::Status::Pending));
        assert_eq!(tx.expenselines[0].comment.as_deref(), Some("pending"));
        assert_eq!(tx.expenselines[1].amount, dec("3.10"));
    }

    #[test]
    fn spans_skip_comments_aliases_and_directives() {
        let source = indoc! {"
            ; Household ledger
            alias food=Expenses:Food
            account Assets:Checking
                note main account

            2024-01-01 Store
                Checking    $-42.50
                food:Groceries

            # a comment between transactions
            2024-01-02 Cafe
                Checking    -$3.10
                food
        "};
        let cache = parse(source).unwrap();
        assert_eq!(cache.len(), 2);
        let spans: Vec<_> = cache
            .transactions
            .iter()
            .map(|tx| (tx.block.first_line, tx.block.last_line))
            .collect();
        assert_eq!(spans, vec![(5, 7), (10, 12)]);

        let lines: Vec<&str> = source.split('\n').collect();
        assert_eq!(lines[5], "2024-01-01 Store");
        assert_eq!(lines[12], "    food");

        assert_eq!(cache.aliases.get("food").map(String::as_str), Some("Expenses:Food"));
        let first = &cache.transactions[0].expenselines[1];
        assert_eq!(first.account, "food:Groceries");
        assert_eq!(first.resolved_account(), "Expenses:Food:Groceries");
        let second = &cache.transactions[1].expenselines;
        assert_eq!(second[0].amount, dec("-3.10"));
        assert_eq!(second[1].amount, dec("3.10"));
        assert_eq!(second[1].resolved_account(), "Expenses:Food");

        assert_eq!(
            cache.accounts,
            vec!["Checking", "Expenses:Food", "Expenses:Food:Groceries"]
        );
        assert_eq!(cache.payees, vec!["Cafe", "Store"]);
    }

    #[test]
    fn crlf_and_missing_final_newline() {
        let source = "2024-01-01 Store\r\n    A    $1\r\n    B\r\n\r\n2024-01-02 Cafe\r\n    A    $2\r\n    B";
        let cache = parse(source).unwrap();
        let spans: Vec<_> = cache
            .transactions
            .iter()
            .map(|tx| (tx.block.first_line, tx.block.last_line))
            .collect();
        assert_eq!(spans, vec![(0, 2), (4, 6)]);
        assert_eq!(cache.transactions[1].expenselines[1].account, "B");
        assert_eq!(cache.transactions[1].expenselines[1].amount, dec("-2"));
    }

    #[test]
    fn empty_input_has_no_transactions() {
        let cache = parse("").unwrap();
        assert!(cache.is_empty());
        let cache = parse("\n\n   \n; only comments\n").unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn all_amounts_given() {
        let source = indoc! {"
            2024-03-01 Split
                Checking    $-30.00
                Food    $20.00
                Fun    $10.00
        "};
        let tx = &parse(source).unwrap().transactions[0];
        let total: Decimal = tx.expenselines.iter().map(|l| l.amount).sum();
        assert!(total.is_zero());
        assert_eq!(tx.expenselines[2].amount, dec("10.00"));
    }

    #[test]
    fn two_elided_amounts_are_rejected() {
        let source = indoc! {"
            2024-01-01 Store
                Checking    $-42.50
                Groceries
                Household
        "};
        let err = parse(source).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidInput { .. }));
        assert_eq!(err.location.0, 4);
    }

    #[test]
    fn malformed_input_is_rejected() {
        let err = parse("    Orphan    $1\n").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidInput { .. }));
        assert_eq!(err.location.0, 1);

        assert!(parse("2024-01-01 Store\n").is_err());
        assert!(parse("2024-01-01 Store\n    Checking    $1,5\n    Food\n").is_err());
    }
}
