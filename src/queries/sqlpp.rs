//! SQL++ renditions of the TPC-CH workload, for AsterixDB-style query
//! services with nested orderlines.

use chrono::NaiveDateTime;

use crate::client::SqlClient;
use crate::generator::ParamGenerator;
use crate::suite::{QueryRunnable, QuerySuite, StatementQuery};

const QUERY_PREFIX: &str = "USE TPC_CH; SET `compiler.arrayindex` \"true\";";

pub fn suite(client: &SqlClient, run_date: NaiveDateTime, exclude: &[String]) -> QuerySuite {
    let dates = ParamGenerator::Dates { run_date };
    let items = ParamGenerator::Items;
    let q = |id, generator, render: fn(&str, &str) -> String| -> Box<dyn QueryRunnable> {
        Box::new(StatementQuery::new(id, generator, client.clone(), render))
    };

    QuerySuite::new(
        vec![
            q("A", dates, |v0, v1| {
                format!(
                    r#"{QUERY_PREFIX}
                    FROM       Orders O, O.o_orderline OL
                    WHERE      OL.ol_delivery_d BETWEEN '{v0}' AND '{v1}'
                    SELECT     COUNT(*);"#
                )
            }),
            q("B", dates, |v0, v1| {
                format!(
                    r#"{QUERY_PREFIX}
                    FROM       Orders O
                    WHERE      SOME OL IN O.o_orderline
                               SATISFIES OL.ol_delivery_d BETWEEN '{v0}' AND '{v1}'
                    SELECT     COUNT(*) AS count_order;"#
                )
            }),
            q("C", dates, |v0, v1| {
                format!(
                    r#"{QUERY_PREFIX}
                    FROM       Orders O
                    WHERE      SOME AND EVERY OL IN O.o_orderline
                               SATISFIES OL.ol_delivery_d BETWEEN '{v0}' AND '{v1}'
                    SELECT     COUNT(*) AS count_order;"#
                )
            }),
            q("D", items, |v0, v1| {
                format!(
                    r#"{QUERY_PREFIX}
                    FROM       Item I, Orders O, O.o_orderline OL
                    WHERE      I.i_id BETWEEN {v0} AND {v1} AND
                               TO_BIGINT(I.i_id) = OL.ol_i_id
                    SELECT     COUNT(*) AS count_order_item;"#
                )
            }),
            q("1", dates, |v0, v1| {
                format!(
                    r#"{QUERY_PREFIX}
                    FROM        Orders O, O.o_orderline OL
                    WHERE       OL.ol_delivery_d BETWEEN '{v0}' AND '{v1}'
                    GROUP BY    OL.ol_number
                    SELECT      OL.ol_number, SUM(OL.ol_quantity) AS sum_qty, SUM(OL.ol_amount) AS sum_amount,
                                AVG(OL.ol_quantity) AS avg_qty, AVG(OL.ol_amount) AS avg_amount,
                                COUNT(*) AS count_order
                    ORDER BY    OL.ol_number;"#
                )
            }),
            q("6", dates, |v0, v1| {
                format!(
                    r#"{QUERY_PREFIX}
                    FROM    Orders O, O.o_orderline OL
                    WHERE   OL.ol_delivery_d BETWEEN '{v0}' AND '{v1}' AND
                            OL.ol_quantity BETWEEN 1 AND 100000
                    SELECT  SUM(OL.ol_amount) AS revenue;"#
                )
            }),
            q("7", dates, |v0, v1| {
                format!(
                    r#"{QUERY_PREFIX}
                    FROM        Orders O, O.o_orderline OL, Stock S, Customer C, Supplier SU, Nation N1, Nation N2
                    LET         s_suppkey = ((S.s_w_id * S.s_i_id) % 10000),
                                c_nationkey = STRING_TO_CODEPOINT(SUBSTR(C.c_state, 1, 1))[0]
                    WHERE       S.s_w_id = TO_BIGINT(OL.ol_supply_w_id) AND
                                S.s_i_id = TO_BIGINT(OL.ol_i_id) AND
                                C.c_id = TO_BIGINT(O.o_c_id) AND
                                C.c_w_id = TO_BIGINT(O.o_w_id) AND
                                C.c_d_id = TO_BIGINT(O.o_d_id) AND
                                SU.su_suppkey = TO_BIGINT(s_suppkey) AND
                                N1.n_nationkey = TO_BIGINT(SU.su_nationkey) AND
                                N2.n_nationkey = TO_BIGINT(c_nationkey) AND
                                ( ( N1.n_name = 'Germany' AND N2.n_name = 'Cambodia' ) OR
                                  ( N1.n_name = 'Cambodia' AND N2.n_name = 'Germany' ) ) AND
                                OL.ol_delivery_d BETWEEN '{v0}' AND '{v1}'
                    GROUP BY    SU.su_nationkey, c_nationkey, SUBSTR(O.o_entry_d, 0, 4)
                    SELECT      SU.su_nationkey AS supp_nation,
                                c_nationkey AS cust_nation,
                                SUBSTR(O.o_entry_d, 0, 4) AS l_year,
                                SUM(OL.ol_amount) AS revenue
                    ORDER BY    SU.su_nationkey, cust_nation, l_year;"#
                )
            }),
            q("12", dates, |v0, v1| {
                format!(
                    r#"{QUERY_PREFIX}
                    FROM        Orders O, O.o_orderline OL
                    WHERE       O.o_entry_d <= OL.ol_delivery_d AND
                                OL.ol_delivery_d BETWEEN '{v0}' AND '{v1}'
                    GROUP BY    O.o_ol_cnt
                    SELECT      O.o_ol_cnt,
                                SUM(CASE WHEN O.o_carrier_id = 1 OR O.o_carrier_id = 2
                                         THEN 1 ELSE 0 END) AS high_line_count,
                                SUM(CASE WHEN O.o_carrier_id <> 1 OR O.o_carrier_id <> 2
                                         THEN 1 ELSE 0 END) AS low_line_count
                    ORDER BY    O.o_ol_cnt;"#
                )
            }),
            q("14", dates, |v0, v1| {
                format!(
                    r#"{QUERY_PREFIX}
                    FROM    Orders O, O.o_orderline OL, Item I
                    WHERE   OL.ol_delivery_d BETWEEN '{v0}' AND '{v1}' AND
                            I.i_id = TO_BIGINT(OL.ol_i_id)
                    SELECT  100.00 * SUM(CASE WHEN I.i_data LIKE 'pr%' THEN OL.ol_amount ELSE 0 END) /
                                (1 + SUM(OL.ol_amount)) AS promo_revenue;"#
                )
            }),
            q("15", dates, |v0, v1| {
                format!(
                    r#"{QUERY_PREFIX}
                    WITH        Revenue AS (
                                FROM        Orders O, O.o_orderline OL, Stock S
                                LET         supplier_no = ((S.s_w_id * S.s_i_id) % 10000)
                                WHERE       S.s_i_id = TO_BIGINT(OL.ol_i_id) AND
                                            S.s_w_id = TO_BIGINT(OL.ol_supply_w_id) AND
                                            OL.ol_delivery_d BETWEEN '{v0}' AND '{v1}'
                                GROUP BY    supplier_no
                                SELECT      supplier_no,
                                            SUM(OL.ol_amount) AS total_revenue
                    )
                    FROM        Revenue R, Supplier SU
                    WHERE       SU.su_suppkey = TO_BIGINT(R.supplier_no) AND
                                R.total_revenue = (
                                    FROM    Revenue
                                    SELECT  VALUE MAX(total_revenue)
                                )[0]
                    SELECT      SU.su_suppkey, SU.su_name, SU.su_address, SU.su_phone, R.total_revenue
                    ORDER BY    SU.su_suppkey;"#
                )
            }),
            q("20", dates, |v0, v1| {
                format!(
                    r#"{QUERY_PREFIX}
                    WITH        SupplierKeys AS (
                                FROM        Orders O, O.o_orderline OL, Stock S, Item I
                                WHERE       OL.ol_i_id = S.s_i_id AND
                                            I.i_id = TO_BIGINT(S.s_i_id) AND
                                            I.i_data LIKE 'co%' AND
                                            OL.ol_delivery_d BETWEEN '{v0}' AND '{v1}'
                                GROUP BY    S.s_i_id, S.s_w_id, S.s_quantity
                                HAVING      (100 * S.s_quantity) > SUM(OL.ol_quantity)
                                SELECT      VALUE ((S.s_w_id * S.s_i_id) % 10000)
                    )
                    FROM        SupplierKeys SK, Supplier SU, Nation N
                    WHERE       SU.su_suppkey = TO_BIGINT(SK) AND
                                N.n_nationkey = TO_BIGINT(SU.su_nationkey) AND
                                N.n_name = 'Germany'
                    SELECT      SU.su_name, SU.su_address
                    ORDER BY    SU.su_name;"#
                )
            }),
        ],
        exclude,
    )
}
