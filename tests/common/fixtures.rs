//! Static feed captures and stats documents used across harnesses.
//!
//! The documents mirror what an Icecast 2.4 server returns from
//! `/admin/stats` and `/admin/listclients`; the feed lines mirror a `STATS`
//! connection right after the initial full dump.

/// Full `/admin/stats` page: server metrics plus one source.
pub const STATS_XML: &str = r#"<?xml version="1.0"?>
<icestats>
  <admin>admin@example.com</admin>
  <banned_IPs>0</banned_IPs>
  <build>20150616004931</build>
  <client_connections>1383589</client_connections>
  <clients>56</clients>
  <connections>1532635</connections>
  <file_connections>4248</file_connections>
  <host>icecast.dev</host>
  <listener_connections>286175</listener_connections>
  <listeners>9</listeners>
  <location>RU</location>
  <outgoing_kbitrate>1363</outgoing_kbitrate>
  <server_id>Icecast 2.4.0-kh1</server_id>
  <server_start>06/Jul/2015:00:19:34 +0300</server_start>
  <server_start_iso8601>2015-07-06T00:19:34+0300</server_start_iso8601>
  <source_client_connections>0</source_client_connections>
  <source_relay_connections>1745</source_relay_connections>
  <source_total_connections>1745</source_total_connections>
  <sources>45</sources>
  <stats>0</stats>
  <stats_connections>1</stats_connections>
  <stream_kbytes_read>3748714817</stream_kbytes_read>
  <stream_kbytes_sent>1678120564</stream_kbytes_sent>
  <source mount="/test.mp3">
    <audio_codecid>2</audio_codecid>
    <audio_info>channels=2;samplerate=44100;bitrate=128</audio_info>
    <authenticator>command</authenticator>
    <bitrate>128</bitrate>
    <connected>85218</connected>
    <genre>Misc</genre>
    <incoming_bitrate>128064</incoming_bitrate>
    <listener_connections>36</listener_connections>
    <listener_peak>1</listener_peak>
    <listeners>0</listeners>
    <listenurl>http://icecast.dev:80/test.mp3</listenurl>
    <max_listeners>-1</max_listeners>
    <metadata_updated>24/Aug/2015:02:07:12 +0300</metadata_updated>
    <mpeg_channels>2</mpeg_channels>
    <mpeg_samplerate>44100</mpeg_samplerate>
    <outgoing_kbitrate>0</outgoing_kbitrate>
    <public>1</public>
    <queue_size>64784</queue_size>
    <server_description>My station description</server_description>
    <server_name>TestFM</server_name>
    <server_type>audio/mpeg</server_type>
    <server_url>http://example.com/</server_url>
    <slow_listeners>0</slow_listeners>
    <source_ip>icecast.dev</source_ip>
    <stream_start>23/Aug/2015:02:26:52 +0300</stream_start>
    <stream_start_iso8601>2015-08-23T02:26:52+0300</stream_start_iso8601>
    <title>Metallica - I Disappear</title>
    <total_bytes_read>1363644219</total_bytes_read>
    <total_bytes_sent>3789824</total_bytes_sent>
    <total_mbytes_sent>3</total_mbytes_sent>
    <yp_currently_playing>Metallica - I Disappear</yp_currently_playing>
  </source>
</icestats>
"#;

/// `/admin/listclients?mount=/test.mp3`: one source with one listener.
pub const LISTMOUNTS_XML: &str = r#"<?xml version="1.0"?>
<icestats>
  <source mount="/test.mp3">
    <Listeners>1</Listeners>
    <listener>
      <IP>192.168.182.30</IP>
      <UserAgent>Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_2) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/44.0.2403.155 Safari/537.36</UserAgent>
      <Referer>http://example.com/</Referer>
      <lag>5642</lag>
      <ID>1541950</ID>
      <Connected>7692</Connected>
    </listener>
  </source>
</icestats>
"#;

/// Two sibling sources, each with one listener.
pub const TWO_SOURCES_XML: &str = r#"<icestats>
  <source mount="/rock.mp3">
    <genre>Rock</genre>
    <listener><ID>1</ID><IP>10.0.0.1</IP><Connected>10</Connected></listener>
  </source>
  <source mount="/jazz.ogg">
    <bitrate>96</bitrate>
    <listener><ID>2</ID><IP>10.0.0.2</IP><Connected>20</Connected></listener>
  </source>
</icestats>"#;

/// A `STATS` feed session: the initial dump, some live updates, a mount
/// going away.
pub const FEED_SESSION: &[&str] = &[
    "EVENT global admin admin@example.com",
    "EVENT global banned_IPs 0",
    "EVENT global client_connections 1029675",
    "EVENT global host icecast.dev",
    "EVENT global server_id Icecast 2.4.0-kh1",
    "EVENT global server_start 06/Jul/2015:00:19:34 +0300",
    "EVENT global stream_kbytes_read 2414225600",
    "NEW audio/mpeg /test.mp3",
    "EVENT /test.mp3 audio_codecid 2",
    "EVENT /test.mp3 audio_info channels=2;samplerate=44100;bitrate=64",
    "EVENT /test.mp3 listenurl http://icecast.dev:80/test.mp3",
    "EVENT /test.mp3 max_listeners -1",
    "EVENT /test.mp3 title Werkdiscs - Helena Hauff - Sworn To Secrecy Part II",
    "INFO full list end",
    "EVENT /test.mp3 listeners 2",
    "FLUSH /test.mp3",
    "DELETE /test.mp3",
];

/// [`FEED_SESSION`] as the bytes a connection would deliver.
pub fn feed_session_bytes(terminator: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    for line in FEED_SESSION {
        bytes.extend_from_slice(line.as_bytes());
        bytes.extend_from_slice(terminator.as_bytes());
    }
    bytes
}

/// Write `contents` to `name` inside `dir` and return the path.
pub fn write_fixture(dir: &std::path::Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("fixture file must be writable");
    path
}
