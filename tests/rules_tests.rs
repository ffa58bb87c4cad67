use sql_advisor::{
    config::RuleLimits,
    query::{AuditContext, SqlDialect, parse},
    rules::{Rule, Severity, builtin}
};

fn ctx(sql: &str) -> AuditContext {
    parse(sql, None, SqlDialect::MySQL).unwrap()
}

fn rule(id: &str) -> Box<dyn Rule> {
    builtin(&RuleLimits::default())
        .into_iter()
        .find(|r| r.info().id == id)
        .unwrap_or_else(|| panic!("no rule {id}"))
}

fn fires(id: &str, sql: &str) -> bool {
    rule(id).check(&ctx(sql)).is_some()
}

#[test]
fn test_every_rule_fires_on_its_case() {
    for rule in builtin(&RuleLimits::default()) {
        if rule.is_placeholder() {
            continue;
        }
        let info = rule.info();
        let context = parse(info.case, None, SqlDialect::MySQL)
            .unwrap_or_else(|e| panic!("{}: case does not parse: {}", info.id, e));
        let finding = rule
            .check(&context)
            .unwrap_or_else(|| panic!("{}: no finding for '{}'", info.id, info.case));
        assert_eq!(finding.rule_id, info.id);
        assert_eq!(finding.severity, info.severity);
    }
}

#[test]
fn test_placeholder_never_reports() {
    let ok = rule("OK");
    assert!(ok.is_placeholder());
    assert!(ok.check(&ctx("select * from t")).is_none());
}

#[test]
fn test_select_star() {
    assert!(fires("COL.001", "select * from t"));
    assert!(!fires("COL.001", "select id from t"));
    assert!(fires("COL.001", "select t.* from t"));
}

#[test]
fn test_insert_without_columns() {
    assert!(fires("COL.002", "insert into t values (1, 2)"));
    assert!(!fires("COL.002", "insert into t (a, b) values (1, 2)"));
}

#[test]
fn test_select_without_where() {
    assert!(fires("CLA.001", "select id from t"));
    assert!(!fires("CLA.001", "select id from t where id = 1"));
    assert!(!fires("CLA.001", "select 1 from dual"));
    assert!(!fires("CLA.001", "select 1"));
}

#[test]
fn test_offset_pagination() {
    assert!(fires("CLA.003", "select a from t where b = 1 limit 10 offset 20"));
    assert!(fires("CLA.003", "select a from t where b = 1 limit 20, 10"));
    assert!(!fires("CLA.003", "select a from t where b = 1 limit 10"));
    assert!(!fires("CLA.003", "select a from t where b = 1 limit 10 offset 0"));
}

#[test]
fn test_mixed_order_direction() {
    assert!(fires("CLA.007", "select a from t where b = 1 order by a desc, c"));
    assert!(!fires("CLA.007", "select a from t where b = 1 order by a desc, c desc"));
}

#[test]
fn test_group_by_needs_order() {
    assert!(fires("CLA.008", "select a, count(*) from t group by a"));
    assert!(!fires("CLA.008", "select a, count(*) from t group by a order by a"));
}

#[test]
fn test_delete_and_update_without_where() {
    assert!(fires("CLA.014", "delete from t"));
    assert!(!fires("CLA.014", "delete from t where id = 1"));
    assert!(fires("CLA.015", "update t set a = 1"));
    assert!(!fires("CLA.015", "update t set a = 1 where id = 2"));
}

#[test]
fn test_leading_wildcard_like() {
    assert!(fires("ARG.001", "select a from t where name like '%abc'"));
    assert!(!fires("ARG.001", "select a from t where name like 'abc%'"));
}

#[test]
fn test_long_in_list_respects_limit() {
    let sql = "select id from t where id in (1, 2, 3)";
    assert!(!fires("ARG.005", sql));

    let strict = RuleLimits {
        max_in_count: 2,
        ..RuleLimits::default()
    };
    let rule = builtin(&strict)
        .into_iter()
        .find(|r| r.info().id == "ARG.005")
        .unwrap();
    assert!(rule.check(&ctx(sql)).is_some());
}

#[test]
fn test_function_on_indexed_column() {
    assert!(fires("FUN.001", "select id from t where date(created) = '2020-01-01'"));
    assert!(!fires("FUN.001", "select id from t where created = now()"));
}

#[test]
fn test_count_column() {
    assert!(fires("FUN.005", "select count(a) from t"));
    assert!(!fires("FUN.005", "select count(*) from t"));
}

#[test]
fn test_sum_null_guard() {
    assert!(fires("FUN.006", "select sum(a) from t"));
    assert!(!fires("FUN.006", "select ifnull(sum(a), 0) from t"));
}

#[test]
fn test_equals_null_is_error() {
    let finding = rule("STA.001").check(&ctx("select a from t where b = null")).unwrap();
    assert_eq!(finding.severity, Severity::Error);
    assert!(!fires("STA.001", "select a from t where b is null"));
}

#[test]
fn test_constant_conditions() {
    assert!(fires("RES.006", "select a from t where 1 = 2"));
    assert!(!fires("RES.006", "select a from t where 1 = 1"));
    assert!(fires("RES.007", "select a from t where 1 = 1"));
    assert!(!fires("RES.007", "select a from t where a = 1"));
}

#[test]
fn test_limit_without_order() {
    assert!(fires("RES.002", "select a from t where b = 1 limit 1"));
    assert!(!fires("RES.002", "select a from t where b = 1 order by a limit 1"));
}

#[test]
fn test_self_join() {
    assert!(fires("JOI.002", "select a.id from t a join t b on a.id = b.pid"));
    assert!(!fires("JOI.002", "select a.id from t a join u b on a.id = b.pid"));
}

#[test]
fn test_join_count_limit() {
    assert!(!fires("JOI.005", "select t1.id from t1 join t2 on t1.id = t2.id"));
}

#[test]
fn test_cross_database() {
    assert!(!fires("JOI.008", "select t1.id from db1.t1 join db1.t2 on t1.id = t2.id"));
}

#[test]
fn test_union_without_all() {
    assert!(fires("SUB.002", "select a from t1 union select a from t2"));
    assert!(!fires("SUB.002", "select a from t1 union all select a from t2"));
}

#[test]
fn test_subquery_depth_limit() {
    assert!(!fires("SUB.004", "select a from t where id in (select id from u)"));
}

#[test]
fn test_truncate_and_destructive() {
    assert!(fires("SEC.001", "truncate table t"));
    assert!(!fires("SEC.001", "delete from t where id = 1"));
    assert!(fires("SEC.003", "delete from t where id = 1"));
    assert!(!fires("SEC.003", "select id from t"));
}

#[test]
fn test_ip_as_string() {
    assert!(fires("LIT.001", "select a from t where ip = '10.0.0.1'"));
    assert!(!fires("LIT.001", "select a from t where ip = 'host'"));
}

#[test]
fn test_self_alias() {
    assert!(fires("ALI.003", "select a as a from t"));
    assert!(!fires("ALI.003", "select a as b from t"));
}
