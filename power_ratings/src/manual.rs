/*!

This is the long-form manual for `power_ratings` and `firebrand`.

## Data directory

The ratings are read from a directory written by the rating pipeline:

```text
politicians.json
contests.json
metadata.json      (optional)
```

### `politicians.json`

An array of politician documents:

```json
[{
  "_id": 17,
  "name": "Jane Roe",
  "searchable_name": "jane roe",
  "rating": {"mu": 2134.5, "sigma": 61.2, "low_confidence": false},
  "ranking": 12,
  "previous_ranking": 15,
  "retired": false,
  "last_ran_in": 2022,
  "party": {"name": "Democratic Party", "color": "#0015bc"},
  "rating_history": [
    {"rating": {"mu": 1500.0, "sigma": 500.0}},
    {"contest_id": 4021, "rating": {"mu": 2134.5, "sigma": 61.2}}
  ]
}]
```

Notes:
- `ranking` orders all the politicians, ranked or not. A politician is ranked
  when the rating is not flagged `low_confidence` and they are not `retired`.
- `previous_ranking` is absent for politicians that were not in the previous
  snapshot; they are shown as new.
- the first entry of `rating_history` is the prior rating and has no
  `contest_id`. Every other entry names the contest that produced it.
- `party` may also be a plain string such as `"Republican Party"`. The color
  is then derived from the name: the last word is dropped and `Democratic`
  and `Republican` get their usual colors, anything else is grey.

### `contests.json`

An array of contest documents:

```json
[{
  "_id": 4021,
  "name": "2022 General Election for Governor",
  "date": "2022-11-08",
  "upcoming": false,
  "source": "https://example.org/results/4021",
  "candidates": [
    {"_id": 17, "name": "Jane Roe", "party": "Democratic Party",
     "votes": 1234567, "won": true, "incumbent": false}
  ]
}]
```

The `date` is either a full RFC 3339 timestamp, a calendar day or a bare year.
A `votes` count of 0 or 1 is a placeholder and is not displayed. A `source`
that is not a web address is shown as text.

### `metadata.json`

```json
{"last_updated": "2023-01-02T03:04:05Z"}
```

## Configuration

`firebrand` reads an optional JSON configuration file, passed with `--config`:

```json
{
  "dataDirectory": "data",
  "leaderboardSize": 100,
  "searchLimit": 100,
  "debounceMillis": 100
}
```

All the keys are optional. A relative `dataDirectory` is resolved against the
directory of the configuration file. The `--data` option overrides it.

## Commands

- `firebrand leaderboard [--limit N]`: the top of the leaderboard
- `firebrand search --query TEXT`: the search endpoint. Without `--query`, it
  fails the way the endpoint does for a missing parameter.
- `firebrand show --id ID` or `firebrand show --name NAME`: the page of one politician
- `firebrand replay --script FILE`: replays the keystrokes of a search box
  through the debouncer and prints the requests and the results shown

The output is JSON, written to the standard output or to the file given with
`--out`. With `--reference FILE`, the output is compared to the content of
the file and the command fails on any difference.

Failures are also written as JSON: `{"error": "...", "status": 400}`.

### Replay scripts

```json
{
  "keystrokes": [{"at": 0, "text": "b"}, {"at": 30, "text": "be"}],
  "latencies": [120, 20]
}
```

Times are in milliseconds on a virtual clock. The request number `k` takes
`latencies[k % len]` milliseconds to complete, or completes immediately when
no latency is given.

 */
