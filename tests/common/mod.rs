//! Shared test doubles and upstream fixtures.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use toprank_core::{
    Category, ClientFactory, HttpClient, HttpError, HttpRequest, HttpResponse, ReportRow,
};

pub const ROOT_URL: &str = "https://exchange.test/zh/";

type Outcome = Result<HttpResponse, HttpError>;
type Matcher = Box<dyn Fn(&HttpRequest) -> bool + Send + Sync>;

struct Route {
    matcher: Matcher,
    /// Played in order; the last outcome repeats forever.
    outcomes: Mutex<VecDeque<Outcome>>,
}

/// Scripted transport that records every request it sees.
///
/// Requests with no matching route get a `404`.
#[derive(Default)]
pub struct MockHttpClient {
    routes: Vec<Route>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(
        mut self,
        matcher: impl Fn(&HttpRequest) -> bool + Send + Sync + 'static,
        outcomes: Vec<Outcome>,
    ) -> Self {
        self.routes.push(Route {
            matcher: Box::new(matcher),
            outcomes: Mutex::new(outcomes.into()),
        });
        self
    }

    /// Matches requests whose base URL (without query) equals `url`.
    pub fn on_url(self, url: &str, outcomes: Vec<Outcome>) -> Self {
        let url = url.to_owned();
        self.route(move |request| request.url == url, outcomes)
    }

    /// Matches report requests for one category code.
    pub fn on_report(self, code: &str, outcomes: Vec<Outcome>) -> Self {
        let code = code.to_owned();
        self.route(
            move |request| request.query_value("type") == Some(code.as_str()),
            outcomes,
        )
    }

    /// Answers warm-up requests with a plain page.
    pub fn with_root(self) -> Self {
        self.on_url(ROOT_URL, vec![ok("<html>home</html>")])
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request log").clone()
    }

    pub fn count_to(&self, url: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.url == url)
            .count()
    }

    fn next_outcome(&self, request: &HttpRequest) -> Outcome {
        let Some(route) = self.routes.iter().find(|route| (route.matcher)(request)) else {
            return Ok(HttpResponse::with_status(404, "not found"));
        };

        let mut outcomes = route.outcomes.lock().expect("route outcomes");
        if outcomes.len() > 1 {
            outcomes.pop_front().expect("non-empty queue")
        } else {
            outcomes
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(HttpResponse::with_status(404, "no script")))
        }
    }
}

impl HttpClient for MockHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let outcome = self.next_outcome(&request);
            self.requests.lock().expect("request log").push(request);
            outcome
        })
    }
}

/// Factory handing out the same recording mock, counting how often it was asked.
pub fn shared_factory(mock: &Arc<MockHttpClient>) -> (ClientFactory, Arc<AtomicUsize>) {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&created);
    let mock = Arc::clone(mock);
    let factory: ClientFactory = Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Arc::clone(&mock) as Arc<dyn HttpClient>
    });
    (factory, created)
}

pub fn ok(body: &str) -> Outcome {
    Ok(HttpResponse::ok(body))
}

pub fn status(code: u16) -> Outcome {
    Ok(HttpResponse::with_status(code, "unavailable"))
}

pub fn connection_reset() -> Outcome {
    Err(HttpError::new("connection reset by peer"))
}

pub fn cement() -> Category {
    Category::new("01", "水泥工業").expect("valid category")
}

/// Rows of the 2022-06-14 cement report, as parsed.
pub fn cement_rows() -> Vec<ReportRow> {
    [
        ("1101", true, "40.10", "0.70"),
        ("1102", false, "43.65", "0.05"),
        ("1103", false, "18.20", "0.05"),
        ("1104", true, "21.70", "0.10"),
        ("1108", false, "10.85", "0.00"),
        ("1109", false, "19.65", "0.20"),
        ("1110", true, "19.25", "0.10"),
        ("1101B", true, "51.60", "0.10"),
    ]
    .into_iter()
    .map(|(ticker, goes_up, price, change)| {
        ReportRow::new(ticker, price, goes_up, change).expect("valid row")
    })
    .collect()
}

/// Minimal report payload with the given `(ticker, direction, price, change)` rows.
pub fn report_json(rows: &[(&str, bool, &str, &str)]) -> String {
    let data: Vec<serde_json::Value> = rows
        .iter()
        .map(|(ticker, goes_up, price, change)| {
            let direction = if *goes_up {
                "<p style= color:red>+</p>"
            } else {
                "<p style= color:green>-</p>"
            };
            serde_json::json!([
                ticker, "", "0", "0", "0", "0", "0", "0", price, direction, change, "0", "0", "0",
                "0", ""
            ])
        })
        .collect();
    serde_json::json!({ "stat": "OK", "data1": data }).to_string()
}

pub const CEMENT_REPORT_JSON: &str = r#"{
    "params": {"response": "json", "date": "20220614", "type": "01"},
    "stat": "OK",
    "fields1": ["證券代號","證券名稱","成交股數","成交筆數","成交金額","開盤價","最高價","最低價","收盤價","漲跌(+/-)","漲跌價差","最後揭示買價","最後揭示買量","最後揭示賣價","最後揭示賣量","本益比"],
    "subtitle1": "111年06月14日每日收盤行情(水泥工業)",
    "data1": [
        ["1101","台泥","26,184,653","17,090","1,051,999,654","40.50","40.55","40.05","40.10","<p style= color:green>-</p>","0.70","40.10","2,284","40.15","529","13.97"],
        ["1101B","台泥乙特","43,581","9","2,242,300","51.40","51.60","51.40","51.60","<p style= color:red>+</p>","0.10","51.30","5","51.50","10",""],
        ["1102","亞泥","4,235,603","2,274","184,770,459","43.70","43.80","43.50","43.65","<p style= color:green>-</p>","0.05","43.65","74","43.70","20","10.75"],
        ["1103","嘉泥","241,460","166","4,365,907","18.30","18.30","18.00","18.20","<p style= color:green>-</p>","0.05","18.15","16","18.25","8","16.70"],
        ["1104","環泥","478,308","379","10,313,347","21.80","21.80","21.40","21.70","<p style= color:green>-</p>","0.10","21.65","4","21.70","6","10.19"],
        ["1108","幸福","161,010","127","1,739,958","10.80","10.90","10.75","10.85","<p> </p>","0.00","10.85","2","10.90","11","16.69"],
        ["1109","信大","229,335","169","4,522,230","19.80","19.85","19.65","19.65","<p style= color:green>-</p>","0.20","19.65","70","19.75","30","10.08"],
        ["1110","東泥","117,002","76","2,234,388","19.35","19.35","18.85","19.25","<p style= color:green>+</p>","0.10","19.20","3","19.25","2","71.30"]
    ],
    "date": "20220614"
}"#;

pub const LISTINGS_HTML: &str = r##"
<table>
    <tbody>
        <tr>
            <td bgcolor="#D5FFD5">有價證券代號及名稱 </td>
            <td bgcolor="#D5FFD5">國際證券辨識號碼(ISIN Code)</td>
            <td bgcolor="#D5FFD5">上市日</td>
            <td bgcolor="#D5FFD5">市場別</td>
            <td bgcolor="#D5FFD5">產業別</td>
            <td bgcolor="#D5FFD5">CFICode</td>
            <td bgcolor="#D5FFD5">備註</td>
        </tr>
        <tr>
            <td bgcolor="#FAFAD2" colspan="7"><b> 股票 <b> </b></b></td>
        </tr>
        <tr>
            <td bgcolor="#FAFAD2">1101　台泥</td>
            <td bgcolor="#FAFAD2">TW0001101004</td>
            <td bgcolor="#FAFAD2">1962/02/09</td>
            <td bgcolor="#FAFAD2">上市</td>
            <td bgcolor="#FAFAD2">水泥工業</td>
            <td bgcolor="#FAFAD2">ESVUFR</td>
            <td bgcolor="#FAFAD2"></td>
        </tr>
        <tr>
            <td bgcolor="#FAFAD2">1102　亞泥</td>
            <td bgcolor="#FAFAD2">TW0001102002</td>
            <td bgcolor="#FAFAD2">1962/06/08</td>
            <td bgcolor="#FAFAD2">上市</td>
            <td bgcolor="#FAFAD2">水泥工業</td>
            <td bgcolor="#FAFAD2">ESVUFR</td>
            <td bgcolor="#FAFAD2"></td>
        </tr>
        <tr>
            <td bgcolor="#FAFAD2">1103　嘉泥</td>
            <td bgcolor="#FAFAD2">TW0001103000</td>
            <td bgcolor="#FAFAD2">1969/11/14</td>
            <td bgcolor="#FAFAD2">上市</td>
            <td bgcolor="#FAFAD2">水泥工業</td>
            <td bgcolor="#FAFAD2">ESVUFR</td>
            <td bgcolor="#FAFAD2"></td>
        </tr>
        <tr>
            <td bgcolor="#FAFAD2">1104　環泥</td>
            <td bgcolor="#FAFAD2">TW0001104008</td>
            <td bgcolor="#FAFAD2">1971/02/01</td>
            <td bgcolor="#FAFAD2">上市</td>
            <td bgcolor="#FAFAD2">水泥</td>
            <td bgcolor="#FAFAD2">ESVUFR</td>
            <td bgcolor="#FAFAD2"></td>
        </tr>
        <tr>
            <td bgcolor="#FAFAD2">1110　東泥</td>
            <td bgcolor="#FAFAD2">TW0001110005</td>
            <td bgcolor="#FAFAD2">1994/10/22</td>
            <td bgcolor="#FAFAD2">上市</td>
            <td bgcolor="#FAFAD2">水泥工業</td>
            <td bgcolor="#FAFAD2">ESVUFR</td>
            <td bgcolor="#FAFAD2"></td>
        </tr>
        <tr>
            <td bgcolor="#FAFAD2">1101B　台泥乙特</td>
            <td bgcolor="#FAFAD2">TW0001101B07</td>
            <td bgcolor="#FAFAD2">2019/01/22</td>
            <td bgcolor="#FAFAD2">上市</td>
            <td bgcolor="#FAFAD2">水泥工業</td>
            <td bgcolor="#FAFAD2">EPNRAR</td>
            <td bgcolor="#FAFAD2"></td>
        </tr>
    </tbody>
</table>
"##;

pub const CATEGORIES_HTML: &str = r##"
<div id="main-form">
    <form class="main" method="post">
        分類項目：<select name="type">
        <option value="MS">大盤統計資訊</option>
        <option value="IND">收盤指數資訊</option>
        <option value="MS2">委託及成交統計資訊</option>
        <option value="ALL">全部</option>
        <option value="ALLBUT0999">全部(不含權證、牛熊證、可展延牛熊證)</option>
        <option value="0049">封閉式基金</option>
        <option value="0099P">ETF</option>
        <option value="029999">ETN</option>
        <option value="019919T">受益證券</option>
        <option value="0999">認購權證(不含牛證)</option>
        <option value="0999P">認售權證(不含熊證)</option>
        <option value="0999C">牛證(不含可展延牛證)</option>
        <option value="0999B">熊證(不含可展延熊證)</option>
        <option value="0999X">可展延牛證</option>
        <option value="0999Y">可展延熊證</option>
        <option value="0999GA">附認股權特別股</option>
        <option value="0999GD">附認股權公司債</option>
        <option value="0999G9">認股權憑證</option>
        <option value="CB">可轉換公司債</option>
        <option value="TIB">創新板股票</option>
        <option value="01">水泥工業</option>
        <option value="02">食品工業</option>
        <option value="03">塑膠工業</option>
        <option value="04">紡織纖維</option>
        <option value="05">電機機械</option>
        <option value="06">電器電纜</option>
        <option value="07">化學生技醫療</option>
        <option value="21">化學工業</option>
        <option value="22">生技醫療業</option>
        <option value="08">玻璃陶瓷</option>
        <option value="09">造紙工業</option>
        <option value="10">鋼鐵工業</option>
        <option value="11">橡膠工業</option>
        <option value="12">汽車工業</option>
        <option value="13">電子工業</option>
        <option value="24">半導體業</option>
        <option value="25">電腦及週邊設備業</option>
        <option value="26">光電業</option>
        <option value="27">通信網路業</option>
        <option value="28">電子零組件業</option>
        <option value="29">電子通路業</option>
        <option value="30">資訊服務業</option>
        <option value="31">其他電子業</option>
        <option value="14">建材營造</option>
        <option value="15">航運業</option>
        <option value="16">觀光事業</option>
        <option value="17">金融保險</option>
        <option value="18">貿易百貨</option>
        <option value="9299">存託憑證</option>
        <option value="23">油電燃氣業</option>
        <option value="19">綜合</option>
        <option value="20">其他</option>
        </select>
    </form>
</div>
"##;
