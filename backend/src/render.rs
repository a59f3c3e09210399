//! HTML rendering of the dashboard pages
//!
//! Pages are assembled with `format!` from typed view models. Every value
//! coming from the ERP or the request goes through [`escape`].

use axum::http::StatusCode;
use axum::response::Html;
use rust_decimal::Decimal;
use shared::models::{AdvisorOption, ReportRow, StoreOption};
use shared::types::DateRange;
use std::fmt::Write;

use crate::error::ErrorDetail;
use crate::services::inventory::InventoryView;
use crate::services::reporting::{AccumulatedReportView, CashCloseView, DailyReportView};

const STYLE: &str = "body{font-family:sans-serif;margin:1.5rem;color:#222}\
table{border-collapse:collapse;width:100%;font-size:.85rem}\
th,td{border:1px solid #ccc;padding:.3rem .5rem}th{background:#f0f0f0}\
td.num{text-align:right}tfoot td{font-weight:bold;background:#fafafa}\
.cards{display:flex;gap:1rem;margin:1rem 0}.card{border:1px solid #ddd;padding:.6rem 1rem;border-radius:4px}\
form{margin:1rem 0;display:flex;gap:1rem;align-items:flex-end;flex-wrap:wrap}\
@media print{form,.actions{display:none}}";

/// Escape text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Two-decimal amount
pub fn amount(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html lang=\"es\"><head><meta charset=\"utf-8\">\
<title>{title}</title><style>{STYLE}</style></head><body>\
<p><a href=\"/\">&larr; Menú principal</a></p><h1>{title}</h1>{body}</body></html>",
        title = escape(title),
    ))
}

/// Print button and download links for the rows currently filtered
fn actions(path: &str, filter_query: &[(&str, String)]) -> String {
    let href = |format: &str| {
        let mut pairs = filter_query.to_vec();
        pairs.push(("format", format.to_string()));
        escape(&format!("{}?{}", path, query_string(&pairs)))
    };
    format!(
        "<p class=\"actions\"><button onclick=\"window.print()\">Imprimir</button> \
<a href=\"{}\">Exportar CSV</a> <a href=\"{}\">Exportar Excel</a></p>",
        href("csv"),
        href("xlsx")
    )
}

fn store_select(name: &str, stores: &[StoreOption], selected: &[String]) -> String {
    let mut html = format!("<label>Tiendas<br><select name=\"{}\" multiple>", escape(name));
    for store in stores {
        let mark = if selected.contains(&store.code) { " selected" } else { "" };
        let _ = write!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            escape(&store.code),
            mark,
            escape(&store.name)
        );
    }
    html.push_str("</select></label>");
    html
}

fn advisor_select(name: &str, advisors: &[AdvisorOption], selected: &[i32]) -> String {
    let mut html = format!("<label>Asesores<br><select name=\"{}\" multiple>", escape(name));
    for advisor in advisors {
        let mark = if selected.contains(&advisor.code) { " selected" } else { "" };
        let _ = write!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            advisor.code,
            mark,
            escape(&advisor.name)
        );
    }
    html.push_str("</select></label>");
    html
}

fn date_inputs(range: &DateRange) -> String {
    format!(
        "<label>Desde<br><input type=\"date\" name=\"fechaInicio\" value=\"{}\"></label>\
<label>Hasta<br><input type=\"date\" name=\"fechaFin\" value=\"{}\"></label>",
        range.start, range.end
    )
}

/// Table of report rows, header taken from the first row. `footer` maps a
/// column name to the total shown under it.
fn rows_table(rows: &[ReportRow], footer: &[(&str, Decimal)]) -> String {
    let Some(first) = rows.first() else {
        return "<p>No hay datos para los filtros seleccionados.</p>".to_string();
    };
    let header: Vec<&str> = first.column_names().collect();

    let mut html = String::from("<table id=\"tablaReporte\"><thead><tr>");
    for column in &header {
        let _ = write!(html, "<th>{}</th>", escape(column));
    }
    html.push_str("</tr></thead><tbody>");

    for row in rows {
        html.push_str("<tr>");
        for column in &header {
            match row.get(column) {
                Some(shared::models::ReportValue::Number(n)) => {
                    let _ = write!(html, "<td class=\"num\">{}</td>", n.normalize());
                }
                Some(value) => {
                    let _ = write!(html, "<td>{}</td>", escape(&value.to_string()));
                }
                None => html.push_str("<td></td>"),
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody>");

    if !footer.is_empty() {
        html.push_str("<tfoot><tr>");
        for (i, column) in header.iter().enumerate() {
            match footer.iter().find(|(name, _)| name == column) {
                Some((_, total)) => {
                    let _ = write!(html, "<td class=\"num\">{}</td>", amount(*total));
                }
                None if i == 0 => html.push_str("<td>TOTAL</td>"),
                None => html.push_str("<td></td>"),
            }
        }
        html.push_str("</tr></tfoot>");
    }
    html.push_str("</table>");
    html
}

fn query_string(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Main menu
pub fn menu() -> Html<String> {
    layout(
        "Reportes Comerciales",
        "<ul>\
<li><a href=\"/inventario\">Inventario</a></li>\
<li><a href=\"/reporte-diario\">Reporte diario de ventas</a></li>\
<li><a href=\"/reporte-acumulado\">Reporte acumulado</a></li>\
<li><a href=\"/cierre-diario\">Cierre de caja diario</a></li>\
</ul>",
    )
}

const REFRESH_SCRIPT: &str = "<script>function cargarInventario(b){b.disabled=true;b.textContent='Cargando...';\
fetch('/cargar-inventario-manual').then(r=>r.json()).then(d=>{if(d.success){location.reload();}\
else{alert(d.error);b.disabled=false;b.textContent='Actualizar inventario';}});}</script>";

/// Inventory page for a cached snapshot
pub fn inventory(view: &InventoryView) -> Html<String> {
    let mut body = format!(
        "<p>Última actualización: <strong>{}</strong> (hace {} min)</p>\
<p class=\"actions\"><button onclick=\"cargarInventario(this)\">Actualizar inventario</button> \
<button onclick=\"window.print()\">Imprimir</button></p>{REFRESH_SCRIPT}\
<div class=\"cards\"><div class=\"card\">Productos: {}</div>\
<div class=\"card\">Stock total: {}</div><div class=\"card\">Disponible total: {}</div><div class=\"card\">En tránsito: {}</div></div>",
        view.captured_at.format("%Y-%m-%d %H:%M:%S UTC"),
        view.age_minutes,
        view.item_count,
        view.total_on_hand.normalize(),
        view.total_available.normalize(),
        view.total_in_transit.normalize(),
    );

    body.push_str(
        "<table id=\"tablaReporte\"><thead><tr><th>Código</th><th>Artículo</th><th>Precio</th>\
<th>Bodega</th><th>Stock</th><th>Comprometido</th><th>Disponible</th>\
<th>Tránsito total</th><th>Tránsito disponible</th></tr></thead><tbody>",
    );
    for item in &view.items {
        let span = item.warehouse_stocks.len().max(1);
        let price = item.list_price.map(amount).unwrap_or_default();
        let _ = write!(
            body,
            "<tr><td rowspan=\"{span}\">{}</td><td rowspan=\"{span}\">{}</td><td rowspan=\"{span}\" class=\"num\">{}</td>",
            escape(&item.item_code),
            escape(&item.item_name),
            price,
        );
        let tail = format!(
            "<td rowspan=\"{span}\" class=\"num\">{}</td><td rowspan=\"{span}\" class=\"num\">{}</td>",
            item.transit_total.normalize(),
            item.transit_available.normalize()
        );
        if item.warehouse_stocks.is_empty() {
            let _ = write!(body, "<td></td><td></td><td></td><td></td>{tail}</tr>");
            continue;
        }
        for (i, stock) in item.warehouse_stocks.iter().enumerate() {
            if i > 0 {
                body.push_str("<tr>");
            }
            let _ = write!(
                body,
                "<td>{} - {}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td>",
                escape(&stock.warehouse_code),
                escape(&stock.warehouse_name),
                stock.on_hand.normalize(),
                stock.committed.normalize(),
                stock.available.normalize(),
            );
            if i == 0 {
                body.push_str(&tail);
            }
            body.push_str("</tr>");
        }
    }
    body.push_str("</tbody></table>");

    layout("Inventario", &body)
}

/// Inventory page when no snapshot has been loaded yet
pub fn inventory_empty() -> Html<String> {
    let body = format!(
        "<p>Todavía no se ha cargado el inventario.</p>\
<p><button onclick=\"cargarInventario(this)\">Actualizar inventario</button></p>{REFRESH_SCRIPT}"
    );
    layout("Inventario", &body)
}

/// Daily sales report
pub fn daily_report(view: &DailyReportView) -> Html<String> {
    let eligibility_options = [("", "Todos"), ("SI", "SI"), ("NO", "NO")]
        .iter()
        .map(|(value, label)| {
            let mark = if view.eligibility == *value { " selected" } else { "" };
            format!("<option value=\"{value}\"{mark}>{label}</option>")
        })
        .collect::<String>();

    let mut filter_query = vec![
        ("fechaInicio", view.range.start.to_string()),
        ("fechaFin", view.range.end.to_string()),
        ("cumpleCondicion", view.eligibility.clone()),
    ];
    filter_query.extend(view.selected_stores.iter().map(|s| ("tiendas", s.clone())));
    filter_query.extend(view.selected_advisors.iter().map(|a| ("asesores", a.to_string())));

    let s = &view.summary;
    let body = format!(
        "<form method=\"get\">{}{}{}<label>Cumple condición<br><select name=\"cumpleCondicion\">{}</select></label>\
<button type=\"submit\">Filtrar</button></form>{}\
<div class=\"cards\"><div class=\"card\">Clientes únicos: {}</div>\
<div class=\"card\">Descuento promedio: {}%</div><div class=\"card\">Valor total: {}</div></div>{}",
        date_inputs(&view.range),
        store_select("tiendas", &view.options.stores, &view.selected_stores),
        advisor_select("asesores", &view.options.advisors, &view.selected_advisors),
        eligibility_options,
        actions("/reporte-diario", &filter_query),
        s.unique_customers,
        amount(s.average_discount),
        amount(s.total_sales),
        rows_table(
            &view.rows,
            &[
                ("Cantidad", s.total_quantity),
                ("Valor Venta", s.total_sales),
                ("Valor Pedido (Cabecera)", s.total_order_value),
            ],
        ),
    );
    layout("Reporte diario de ventas", &body)
}

/// Accumulated report per store and advisor
pub fn accumulated_report(view: &AccumulatedReportView) -> Html<String> {
    let mut filter_query = vec![
        ("fechaInicio", view.range.start.to_string()),
        ("fechaFin", view.range.end.to_string()),
    ];
    filter_query.extend(view.selected_stores.iter().map(|s| ("sucursales", s.clone())));
    filter_query.extend(view.selected_advisors.iter().map(|a| ("vendedores", a.to_string())));

    let body = format!(
        "<form method=\"get\">{}{}{}<button type=\"submit\">Filtrar</button></form>{}{}",
        date_inputs(&view.range),
        store_select("sucursales", &view.options.stores, &view.selected_stores),
        advisor_select("vendedores", &view.options.advisors, &view.selected_advisors),
        actions("/reporte-acumulado", &filter_query),
        rows_table(&view.rows, &view.totals.as_columns()),
    );
    layout("Reporte acumulado", &body)
}

/// Daily cash close grouped by payment type
pub fn cash_close(view: &CashCloseView) -> Html<String> {
    let mut filter_query = vec![
        ("fecha", view.date.to_string()),
    ];
    filter_query.extend(view.selected_stores.iter().map(|s| ("tiendas", s.clone())));

    let mut body = format!(
        "<form method=\"get\"><label>Fecha<br><input type=\"date\" name=\"fecha\" value=\"{}\"></label>{}\
<button type=\"submit\">Filtrar</button></form>{}",
        view.date,
        store_select("tiendas", &view.stores, &view.selected_stores),
        actions("/cierre-diario", &filter_query),
    );

    if view.payments.groups.is_empty() {
        body.push_str("<p>No hay pagos registrados para esta fecha.</p>");
    }
    for (payment_type, rows) in view.payments.groups.iter() {
        let subtotal = view.payments.totals.get(payment_type).unwrap_or_default();
        let _ = write!(
            body,
            "<h2>{} <small>({})</small></h2>{}",
            escape(payment_type),
            amount(subtotal),
            rows_table(rows, &[("Importe", subtotal)]),
        );
    }
    let _ = write!(
        body,
        "<h2>Total general: {}</h2>",
        amount(view.payments.grand_total())
    );

    layout("Cierre de caja diario", &body)
}

/// Error page with the message staff should read
pub fn error_page(status: StatusCode, detail: &ErrorDetail) -> Html<String> {
    let body = format!(
        "<p><strong>{}</strong></p><p><small>{} ({})</small></p>",
        escape(&detail.message_es),
        escape(&detail.message_en),
        status.as_u16(),
    );
    layout("Error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<a href='x'>&\"</a>"),
            "&lt;a href=&#39;x&#39;&gt;&amp;&quot;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_amount_has_two_decimals() {
        assert_eq!(amount(Decimal::new(12345, 3)), "12.35");
        assert_eq!(amount(Decimal::from(7)), "7.00");
    }

    #[test]
    fn test_rows_table_footer() {
        let rows = vec![
            ReportRow::new().with("Tienda", "BOSQUE").with("Cantidad", 2_i32),
            ReportRow::new().with("Tienda", "<LOJA>").with("Cantidad", 3_i32),
        ];
        let html = rows_table(&rows, &[("Cantidad", Decimal::from(5))]);

        assert!(html.contains("<th>Tienda</th>"));
        assert!(html.contains("&lt;LOJA&gt;"));
        assert!(html.contains("<td>TOTAL</td><td class=\"num\">5.00</td>"));
    }

    #[test]
    fn test_actions_link_both_exports() {
        let html = actions("/cierre-diario", &[("fecha", "2024-05-01".to_string())]);
        assert!(html.contains("/cierre-diario?fecha=2024-05-01&amp;format=csv"));
        assert!(html.contains("/cierre-diario?fecha=2024-05-01&amp;format=xlsx"));
    }

    #[test]
    fn test_rows_table_empty() {
        assert!(rows_table(&[], &[]).contains("No hay datos"));
    }
}
