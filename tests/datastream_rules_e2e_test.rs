// ==========================================
// 表单数据流规则端到端测试
// ==========================================
// 测试目标: 发票数据流追加明细组、按 SQLite 中的排序组重排行
// ==========================================

mod helpers;

use helpers::mock_sources::{OfflineSortGroups, StaticSortGroups};
use p21_business_rules::config::RuleConfig;
use p21_business_rules::domain::{
    DatastreamLayout, RuleContext, RuleData, RuleLog, RuleState, Session, XmlDatastream,
};
use p21_business_rules::engine::{FormDatastreamAddGroup, FormDatastreamSortInvoiceLines};
use p21_business_rules::repository::SqliteInvoiceSortGroupRepository;
use p21_business_rules::{RuleErrorKind, RuleRunner};
use std::sync::atomic::Ordering;
use test_helpers::*;

/// 打印预览：一个文件两张发票
const PREVIEW_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<FORMS>
  <FORM>
    <HEADER>
      <INVOICE_NUMBER>1001</INVOICE_NUMBER>
      <CARRIERDEF><XCARRIER_NAME>UPS Ground</XCARRIER_NAME></CARRIERDEF>
    </HEADER>
    <LINES>
      <LINE><LINE_NUMBER>1</LINE_NUMBER><INVOICE_LINE_ITEM_ID>BOLT</INVOICE_LINE_ITEM_ID></LINE>
      <LINE><LINE_NUMBER>2</LINE_NUMBER><INVOICE_LINE_ITEM_ID>NUT</INVOICE_LINE_ITEM_ID></LINE>
      <LINE><LINE_NUMBER>3</LINE_NUMBER><INVOICE_LINE_ITEM_ID>WASHER</INVOICE_LINE_ITEM_ID></LINE>
    </LINES>
  </FORM>
  <FORM>
    <HEADER>
      <INVOICE_NUMBER>1002</INVOICE_NUMBER>
      <CARRIERDEF><XCARRIER_NAME>FedEx</XCARRIER_NAME></CARRIERDEF>
    </HEADER>
    <LINES>
      <LINE><LINE_NUMBER>1</LINE_NUMBER><INVOICE_LINE_ITEM_ID>GEAR</INVOICE_LINE_ITEM_ID></LINE>
      <LINE><LINE_NUMBER>2</LINE_NUMBER><INVOICE_LINE_ITEM_ID>BOLT</INVOICE_LINE_ITEM_ID></LINE>
    </LINES>
  </FORM>
</FORMS>"#;

fn datastream_context(ds: XmlDatastream, session: Session, log: RuleLog) -> RuleContext {
    RuleContext::new(
        RuleData::new().with_datastream(ds),
        session,
        RuleState::single_row(),
        log,
    )
}

// ==========================================
// FormDatastream_SortInvoiceLines
// ==========================================

#[test]
fn test_sort_invoice_lines_from_sqlite() {
    let (_db_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    // BOLT=3, NUT=未设置, WASHER=1, GEAR=2
    insert_item_sort_group(&conn, 10, Some(3)).unwrap();
    insert_item_sort_group(&conn, 20, None).unwrap();
    insert_item_sort_group(&conn, 30, Some(1)).unwrap();
    insert_item_sort_group(&conn, 40, Some(2)).unwrap();
    insert_invoice_line(&conn, "1001", 1, 10).unwrap();
    insert_invoice_line(&conn, "1001", 2, 20).unwrap();
    insert_invoice_line(&conn, "1001", 3, 30).unwrap();
    insert_invoice_line(&conn, "1002", 1, 40).unwrap();
    insert_invoice_line(&conn, "1002", 2, 10).unwrap();
    drop(conn);

    let dir = tempfile::tempdir().unwrap();
    let (path, ds) = write_datastream(dir.path(), PREVIEW_XML).unwrap();
    let session = Session::new("p21-sql", &db_path, "invoicing");
    let mut ctx = datastream_context(ds, session, RuleLog::in_memory());

    let rule = FormDatastreamSortInvoiceLines::with_source(
        Box::new(SqliteInvoiceSortGroupRepository::new()),
        &RuleConfig::default(),
    );
    let result = RuleRunner::invoke(&rule, &mut ctx);
    assert!(result.success, "{}", result.message);
    assert!(ctx.log.entries().is_empty());

    let order = saved_line_numbers(&path).unwrap();
    assert_eq!(order, vec![vec!["3", "1", "2"], vec!["1", "2"]]);

    let saved = XmlDatastream::load(&path, DatastreamLayout::default()).unwrap();
    let groups: Vec<String> = saved
        .lines()
        .into_iter()
        .map(|r| saved.line(r).unwrap().element_value("INVOICE_SORT_GROUP").unwrap())
        .collect();
    assert_eq!(groups, vec!["1", "3", "9999", "2", "3"]);
}

#[test]
fn test_sort_invoice_lines_one_lookup_per_form() {
    let dir = tempfile::tempdir().unwrap();
    let (path, ds) = write_datastream(dir.path(), PREVIEW_XML).unwrap();

    let source = StaticSortGroups::new()
        .group("1001", 1, 20)
        .group("1001", 2, 10)
        .group("1002", 2, 5);
    let calls = source.calls();
    let rule = FormDatastreamSortInvoiceLines::with_source(Box::new(source), &RuleConfig::default());

    let mut ctx = datastream_context(ds, Session::default(), RuleLog::in_memory());
    assert!(RuleRunner::invoke(&rule, &mut ctx).success);

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        saved_line_numbers(&path).unwrap(),
        vec![vec!["2", "1", "3"], vec!["2", "1"]]
    );
}

#[test]
fn test_sort_invoice_lines_offline_uses_defaults_and_logs() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("logs").join("p21_rules.log");
    let (path, ds) = write_datastream(dir.path(), PREVIEW_XML).unwrap();

    let config = RuleConfig {
        default_invoice_sort_group: 500,
        ..RuleConfig::default()
    };
    let rule = FormDatastreamSortInvoiceLines::with_source(Box::new(OfflineSortGroups), &config);
    let mut ctx = datastream_context(
        ds,
        Session::new("p21-sql", "P21", "invoicing"),
        RuleLog::persistent(&log_path),
    );

    let result = RuleRunner::invoke(&rule, &mut ctx);
    assert!(result.success);

    // 每张发票一条查询失败记录
    assert_eq!(ctx.log.entries().len(), 2);
    let persisted = std::fs::read_to_string(&log_path).unwrap();
    assert_eq!(persisted.lines().count(), 2);
    assert!(persisted.contains("Error retrieving invoice sort group info: "));
    assert!(persisted.contains("cannot reach p21-sql"));

    // 全部默认值，顺序不变
    assert_eq!(
        saved_line_numbers(&path).unwrap(),
        vec![vec!["1", "2", "3"], vec!["1", "2"]]
    );
    let saved = std::fs::read_to_string(&path).unwrap();
    assert_eq!(saved.matches("<INVOICE_SORT_GROUP>500</INVOICE_SORT_GROUP>").count(), 5);
}

#[test]
fn test_sort_without_origin_file_fails_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("p21_rules.log");
    let ds = XmlDatastream::parse(PREVIEW_XML, DatastreamLayout::default()).unwrap();

    let rule = FormDatastreamSortInvoiceLines::with_source(
        Box::new(StaticSortGroups::new()),
        &RuleConfig::default(),
    );
    let mut ctx = datastream_context(ds, Session::default(), RuleLog::persistent(&log_path));

    let report = RuleRunner::run(&rule, &mut ctx);
    assert!(!report.result.success);
    assert_eq!(report.error_kind, Some(RuleErrorKind::Datastream));
    assert_eq!(report.result.message, "Datastream has no origin file path");
    assert!(std::fs::read_to_string(&log_path)
        .unwrap()
        .contains("Datastream has no origin file path"));
}

// ==========================================
// FormDatastream_AddGroup
// ==========================================

#[test]
fn test_add_group_across_forms() {
    let dir = tempfile::tempdir().unwrap();
    let (path, ds) = write_datastream(dir.path(), PREVIEW_XML).unwrap();
    let mut ctx = datastream_context(ds, Session::default(), RuleLog::in_memory());

    let result = RuleRunner::invoke(&FormDatastreamAddGroup, &mut ctx);
    assert!(result.success, "{}", result.message);

    let saved = XmlDatastream::load(&path, DatastreamLayout::default()).unwrap();
    let headers = saved.headers();
    assert_eq!(headers.len(), 2);

    // 只修改第一个表头的承运商
    let carrier = |i: usize| {
        saved
            .header(headers[i])
            .unwrap()
            .element("CARRIERDEF")
            .unwrap()
            .element_value("XCARRIER_NAME")
            .unwrap()
    };
    assert_eq!(carrier(0), "Modified Carrier Name");
    assert_eq!(carrier(1), "FedEx");

    let invoice_numbers: Vec<String> = headers
        .iter()
        .map(|h| {
            saved
                .header(*h)
                .unwrap()
                .element("HDRTSTXDEF")
                .unwrap()
                .element_value("INVOICE_NO")
                .unwrap()
        })
        .collect();
    assert_eq!(invoice_numbers, vec!["1001", "1002"]);

    let items: Vec<String> = saved
        .lines()
        .into_iter()
        .map(|l| {
            let group = saved.line(l).unwrap().element("LINETSTDEF").unwrap().clone();
            assert_eq!(group.element_value("TEST_TEXT").as_deref(), Some("Line Test Text"));
            group.element_value("ITEM_ID").unwrap()
        })
        .collect();
    assert_eq!(items, vec!["BOLT", "NUT", "WASHER", "GEAR", "BOLT"]);
}

#[test]
fn test_add_group_without_datastream_is_reported() {
    let mut ctx = RuleContext::local(RuleData::new(), RuleState::single_row());
    let report = RuleRunner::run(&FormDatastreamAddGroup, &mut ctx);
    assert!(!report.result.success);
    assert_eq!(report.error_kind, Some(RuleErrorKind::NotFound));
    assert_eq!(ctx.log.messages(), vec![report.result.message.as_str()]);
}
